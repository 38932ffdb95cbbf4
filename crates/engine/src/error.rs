use thiserror::Error;

use comanda_client::CollaboratorError;
use comanda_core::DomainError;

/// Engine-level failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Deterministic domain failure (validation, invariant, conflict),
    /// caught before any network call.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The collaborator failed; the remote message is preserved verbatim.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Another billing operation for the same document is still running.
    #[error("a billing operation is already in flight for {0}")]
    AlreadyInFlight(String),

    /// The typed confirmation phrase for a destructive operation did not
    /// match exactly.
    #[error("confirmation phrase does not match")]
    ConfirmationMismatch,
}
