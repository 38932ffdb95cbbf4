//! Request/response DTOs and JSON mapping helpers.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use comanda_billing::{Bill, BillingDetails, IssueWarning};
use comanda_core::{Aggregate, AggregateId, DomainError};
use comanda_orders::{AddItem, CreateOrder, Order, OrderCommand, OrderId, OrderType};

/// One order line in an issuance request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub name: String,
    pub quantity: i64,
    /// Smallest currency unit (cents).
    pub unit_price: u64,
}

/// Order snapshot in an issuance request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    /// Existing order id; a fresh one is minted when absent.
    pub id: Option<String>,
    pub customer_name: String,
    pub order_type: OrderType,
    pub order_number: Option<String>,
    pub items: Vec<OrderItemDto>,
}

/// Customer billing data in an issuance request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub identification: String,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueInvoiceRequest {
    pub order: OrderDto,
    pub client: ClientDto,
    /// Whole percent.
    pub tax_rate: u8,
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreflightResponse {
    pub warnings: Vec<IssueWarning>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatusRequest {
    pub access_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteRequestDto {
    /// The bill record as currently held by the client (from the listing).
    pub bill: Bill,
    /// Two-digit regulator reason code ('01'..'07').
    pub reason_code: String,
    pub description: Option<String>,
    pub tax_rate: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequest {
    pub confirmation: String,
}

/// Rehydrate a domain [`Order`] from the request snapshot, running every
/// aggregate invariant (positive quantities, overflow checks, non-empty
/// names) on the way in.
pub fn build_order(dto: &OrderDto) -> Result<Order, DomainError> {
    let order_id = match &dto.id {
        Some(raw) => OrderId::new(raw.parse::<AggregateId>()?),
        None => OrderId::new(AggregateId::new()),
    };

    let mut order = Order::empty(order_id);
    let now = Utc::now();

    let events = order.handle(&OrderCommand::CreateOrder(CreateOrder {
        order_id,
        customer_name: dto.customer_name.clone(),
        order_type: dto.order_type,
        order_number: dto.order_number.clone(),
        occurred_at: now,
    }))?;
    for event in &events {
        order.apply(event);
    }

    for item in &dto.items {
        let events = order.handle(&OrderCommand::AddItem(AddItem {
            order_id,
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            occurred_at: now,
        }))?;
        for event in &events {
            order.apply(event);
        }
    }

    Ok(order)
}

pub fn billing_details(dto: &ClientDto) -> BillingDetails {
    BillingDetails {
        identification: dto.identification.clone(),
        name: dto.name.clone(),
        address: dto.address.clone(),
        email: dto.email.clone(),
    }
}
