//! Restaurant configuration: fiscal identity, document sequences, and the
//! client-side cache of the backend-owned configuration aggregate.
//!
//! Sequence counters in here are **display material only**. The backend
//! advances them when it persists a document; this crate never increments
//! anything on its own, it only estimates what the next number will look
//! like. Whether the backend assigns sequences gap-free under concurrent
//! operators is a backend guarantee this client assumes but cannot verify.

pub mod cache;
pub mod settings;

pub use cache::ConfigCache;
pub use settings::{
    BillingConfig, BillingConfigPatch, ContactInfo, ContactInfoPatch, RestaurantConfig,
    RestaurantConfigPatch, TaxRegime,
};
