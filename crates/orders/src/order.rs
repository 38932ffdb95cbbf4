use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comanda_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event};

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Delivery,
    Takeout,
}

/// Kitchen-facing order status.
///
/// The cycle is operator-driven and intentionally closed:
/// New -> Ready -> Completed -> New.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Ready,
    Completed,
}

impl OrderStatus {
    /// Next status in the operator cycle.
    pub fn next(self) -> OrderStatus {
        match self {
            OrderStatus::New => OrderStatus::Ready,
            OrderStatus::Ready => OrderStatus::Completed,
            OrderStatus::Completed => OrderStatus::New,
        }
    }
}

/// A single ordered line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub line_no: u32,
    pub name: String,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Set by the kitchen once the item has been prepared.
    pub prepared: bool,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    customer_name: String,
    order_type: OrderType,
    status: OrderStatus,
    items: Vec<OrderItem>,
    order_number: Option<String>,
    billed: bool,
    created_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            customer_name: String::new(),
            order_type: OrderType::DineIn,
            status: OrderStatus::New,
            items: Vec::new(),
            order_number: None,
            billed: false,
            created_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn order_number(&self) -> Option<&str> {
        self.order_number.as_deref()
    }

    pub fn is_billed(&self) -> bool {
        self.billed
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Invariant: the order total is always the sum of `price * quantity`
    /// over all items. Per-item and running totals are overflow-checked at
    /// `AddItem` time, so the fold here cannot overflow.
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc + (item.quantity as u64) * item.unit_price)
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub order_type: OrderType,
    pub order_number: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub order_id: OrderId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkItemPrepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkItemPrepared {
    pub order_id: OrderId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdvanceStatus (cycles New -> Ready -> Completed -> New).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStatus {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkBilled.
///
/// Issued only after the billing backend has persisted the bill; the client
/// must never mark an order billed optimistically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkBilled {
    pub order_id: OrderId,
    /// Identifier of the persisted bill, as reported by the backend.
    pub bill_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    CreateOrder(CreateOrder),
    AddItem(AddItem),
    MarkItemPrepared(MarkItemPrepared),
    AdvanceStatus(AdvanceStatus),
    MarkBilled(MarkBilled),
}

/// Event: OrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub customer_name: String,
    pub order_type: OrderType,
    pub order_number: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub order_id: OrderId,
    pub line_no: u32,
    pub name: String,
    pub quantity: i64,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemPrepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPrepared {
    pub order_id: OrderId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAdvanced {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderBilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBilled {
    pub order_id: OrderId,
    pub bill_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderCreated(OrderCreated),
    ItemAdded(ItemAdded),
    ItemPrepared(ItemPrepared),
    StatusAdvanced(StatusAdvanced),
    OrderBilled(OrderBilled),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "orders.order.created",
            OrderEvent::ItemAdded(_) => "orders.order.item_added",
            OrderEvent::ItemPrepared(_) => "orders.order.item_prepared",
            OrderEvent::StatusAdvanced(_) => "orders.order.status_advanced",
            OrderEvent::OrderBilled(_) => "orders.order.billed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated(e) => e.occurred_at,
            OrderEvent::ItemAdded(e) => e.occurred_at,
            OrderEvent::ItemPrepared(e) => e.occurred_at,
            OrderEvent::StatusAdvanced(e) => e.occurred_at,
            OrderEvent::OrderBilled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderCreated(e) => {
                self.id = e.order_id;
                self.customer_name = e.customer_name.clone();
                self.order_type = e.order_type;
                self.order_number = e.order_number.clone();
                self.status = OrderStatus::New;
                self.items.clear();
                self.billed = false;
                self.created_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::ItemAdded(e) => {
                self.items.push(OrderItem {
                    line_no: e.line_no,
                    name: e.name.clone(),
                    quantity: e.quantity,
                    unit_price: e.unit_price,
                    prepared: false,
                });
            }
            OrderEvent::ItemPrepared(e) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.line_no == e.line_no) {
                    item.prepared = true;
                }
            }
            OrderEvent::StatusAdvanced(e) => {
                self.status = e.to;
            }
            OrderEvent::OrderBilled(_) => {
                self.billed = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::CreateOrder(cmd) => self.handle_create(cmd),
            OrderCommand::AddItem(cmd) => self.handle_add_item(cmd),
            OrderCommand::MarkItemPrepared(cmd) => self.handle_mark_prepared(cmd),
            OrderCommand::AdvanceStatus(cmd) => self.handle_advance_status(cmd),
            OrderCommand::MarkBilled(cmd) => self.handle_mark_billed(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("order already exists"));
        }
        if cmd.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer name must not be empty"));
        }

        Ok(vec![OrderEvent::OrderCreated(OrderCreated {
            order_id: cmd.order_id,
            customer_name: cmd.customer_name.clone(),
            order_type: cmd.order_type,
            order_number: cmd.order_number.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        if self.billed {
            return Err(DomainError::invariant("cannot modify a billed order"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("item name must not be empty"));
        }
        if cmd.quantity <= 0 {
            return Err(DomainError::validation("item quantity must be positive"));
        }
        if cmd.unit_price == 0 {
            return Err(DomainError::validation("item unit_price must be positive"));
        }

        let line_total = (cmd.quantity as u128)
            .checked_mul(cmd.unit_price as u128)
            .ok_or_else(|| DomainError::invariant("item amount overflow"))?;
        let new_total = (self.total() as u128)
            .checked_add(line_total)
            .ok_or_else(|| DomainError::invariant("order total overflow"))?;
        if new_total > u64::MAX as u128 {
            return Err(DomainError::invariant("order total overflow"));
        }

        let line_no = self.items.len() as u32 + 1;

        Ok(vec![OrderEvent::ItemAdded(ItemAdded {
            order_id: cmd.order_id,
            line_no,
            name: cmd.name.clone(),
            quantity: cmd.quantity,
            unit_price: cmd.unit_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_prepared(&self, cmd: &MarkItemPrepared) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        let item = self
            .items
            .iter()
            .find(|i| i.line_no == cmd.line_no)
            .ok_or_else(|| DomainError::validation("unknown item line"))?;
        if item.prepared {
            return Err(DomainError::conflict("item is already prepared"));
        }

        Ok(vec![OrderEvent::ItemPrepared(ItemPrepared {
            order_id: cmd.order_id,
            line_no: cmd.line_no,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_advance_status(&self, cmd: &AdvanceStatus) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        Ok(vec![OrderEvent::StatusAdvanced(StatusAdvanced {
            order_id: cmd.order_id,
            from: self.status,
            to: self.status.next(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_billed(&self, cmd: &MarkBilled) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        if self.billed {
            return Err(DomainError::conflict("order is already billed"));
        }
        if !self.has_items() {
            return Err(DomainError::invariant("cannot bill an order without items"));
        }

        Ok(vec![OrderEvent::OrderBilled(OrderBilled {
            order_id: cmd.order_id,
            bill_id: cmd.bill_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
