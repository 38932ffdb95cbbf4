//! Billing engine: the orchestration layer between the UI surface and the
//! billing backend.
//!
//! One [`BillingEngine`] per process coordinates invoice issuance, credit
//! notes, manual status checks, configuration synchronization, and the
//! destructive system reset. It owns the duplicate-fire protection (one
//! operation in flight per document) and drives the issuance state machine
//! from collaborator signals; the true serialization point for sequence
//! numbers stays in the backend.

mod error;
mod guard;

pub mod credit_note;
pub mod orchestrator;
pub mod reset;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use comanda_client::{BillingService, ConfigApi};
use comanda_config::ConfigCache;

pub use error::EngineError;
pub use orchestrator::{IssuanceObserver, IssuanceOutcome, NullObserver, PrintReceipt};
pub use reset::{confirmation_matches, RESET_CONFIRMATION_PHRASE};
pub use sync::ConfigSynchronizer;

use guard::InFlight;

/// Billing orchestration facade.
pub struct BillingEngine {
    billing: Arc<dyn BillingService>,
    sync: ConfigSynchronizer,
    in_flight: InFlight,
}

impl BillingEngine {
    pub fn new(billing: Arc<dyn BillingService>, config_api: Arc<dyn ConfigApi>) -> Self {
        Self {
            billing,
            sync: ConfigSynchronizer::new(config_api, Arc::new(ConfigCache::new())),
            in_flight: InFlight::default(),
        }
    }

    /// The config synchronizer (cache access, manual refresh).
    pub fn config(&self) -> &ConfigSynchronizer {
        &self.sync
    }
}
