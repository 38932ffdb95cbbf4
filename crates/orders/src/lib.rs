//! Orders domain module.
//!
//! Business rules for restaurant orders (dine-in, delivery, takeout),
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//! Billing never mutates an order directly; an order is only marked billed
//! once the billing backend has persisted the corresponding bill.

pub mod order;

pub use order::{
    AddItem, AdvanceStatus, CreateOrder, ItemAdded, ItemPrepared, MarkBilled, MarkItemPrepared,
    Order, OrderBilled, OrderCommand, OrderCreated, OrderEvent, OrderId, OrderItem, OrderStatus,
    OrderType, StatusAdvanced,
};
