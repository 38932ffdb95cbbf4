//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are domain objects that are **immutable** and **compared by value**.
/// They represent concepts where identity doesn't matter - only the values matter.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (two value objects with same values are equal)
/// - **Entity**: Has identity (two entities with same ID are the same entity)
///
/// Example:
/// - `DocumentNumber { establishment: "001", .. }` is a value object
/// - `Order { id: OrderId(...), .. }` is an entity
///
/// ## Immutability
///
/// Value objects should be **immutable** - once created, they don't change. To "modify"
/// a value object, create a new one with the new values.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
