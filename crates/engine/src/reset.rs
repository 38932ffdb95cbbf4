//! Destructive billing-system reset.
//!
//! Purges every bill and credit note, resets sequence counters, and unmarks
//! billed orders, all server-side and irreversible. The gate is a typed
//! literal phrase, not a yes/no dialog: the operator must type the exact
//! phrase for the action to run at all.

use crate::error::EngineError;
use crate::BillingEngine;

/// The phrase the operator must type, exactly and case-sensitively.
pub const RESET_CONFIRMATION_PHRASE: &str = "ELIMINAR TODO";

/// Whether the typed phrase opens the gate. Exact match only; the UI keeps
/// its confirm action disabled while this is false.
pub fn confirmation_matches(input: &str) -> bool {
    input == RESET_CONFIRMATION_PHRASE
}

impl BillingEngine {
    /// Wipe the billing system.
    ///
    /// Refuses with [`EngineError::ConfirmationMismatch`] unless
    /// `confirmation` equals [`RESET_CONFIRMATION_PHRASE`] exactly. After
    /// the backend reset, the cached configuration is dropped (its sequence
    /// counters are gone) and refetched.
    pub async fn reset_system(&self, confirmation: &str) -> Result<(), EngineError> {
        if !confirmation_matches(confirmation) {
            return Err(EngineError::ConfirmationMismatch);
        }

        tracing::warn!("resetting billing system: purging bills, credit notes, and sequences");
        self.billing.reset_system().await?;

        self.sync.cache().clear().await;
        if let Err(err) = self.sync.refresh().await {
            tracing::warn!(error = %err, "config refresh after system reset failed");
        }

        Ok(())
    }
}
