//! Wire DTOs for the billing backend API.
//!
//! Field names follow the backend's JSON (camelCase, Spanish authority field
//! names inside `sriResponse`), so these types round-trip the payloads
//! unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comanda_billing::{AccessKey, Bill, BillId, SriStatus};
use comanda_orders::OrderId;

/// One order line as submitted for invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub name: String,
    pub quantity: i64,
    /// Smallest currency unit (cents).
    pub unit_price: u64,
}

/// Order snapshot as submitted for invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub id: OrderId,
    pub order_number: Option<String>,
    pub items: Vec<OrderItemPayload>,
    /// Amounts in smallest currency unit, computed client-side from the
    /// order lines and the tax rate.
    pub subtotal: u64,
    pub tax: u64,
    pub total: u64,
}

/// Customer data as submitted for invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub identification: String,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
}

/// Request body for invoice generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceRequest {
    pub order: OrderPayload,
    pub client: ClientPayload,
    /// Whole percent.
    pub tax_rate: u8,
    pub logo_url: Option<String>,
}

/// Authority response fields, passed through by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SriResponsePayload {
    pub estado: Option<SriStatus>,
    pub fecha_autorizacion: Option<DateTime<Utc>>,
    /// Authority/validation message; shown to the operator verbatim.
    pub mensaje: Option<String>,
}

/// Response body for invoice generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceResponse {
    pub success: bool,
    pub invoice_id: Option<BillId>,
    pub access_key: Option<AccessKey>,
    pub sri_response: Option<SriResponsePayload>,
}

/// Request body for credit-note generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditNotePayload {
    pub bill_id: BillId,
    /// Reason text: the regulator-mandated label, with the operator's
    /// detail appended when present.
    pub reason: String,
    pub custom_description: Option<String>,
    pub tax_rate: u8,
}

/// Status snapshot returned by a manual check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub sri_status: SriStatus,
    pub authorized_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

/// Listing filters; `None` fields are omitted from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListBillsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub identification: Option<String>,
    pub document_number: Option<String>,
}

impl ListBillsParams {
    /// Query pairs for the backend's listing endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(identification) = &self.identification {
            pairs.push(("identification", identification.clone()));
        }
        if let Some(document_number) = &self.document_number {
            pairs.push(("documentNumber", document_number.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
}

/// One page of bills from the history/listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPage {
    pub data: Vec<Bill>,
    pub pagination: Pagination,
}
