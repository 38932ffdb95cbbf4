//! Collaborator-boundary errors.

use thiserror::Error;

/// Failure talking to the billing backend or the config API.
///
/// `Remote` carries the backend's message **verbatim**: authority errors
/// often contain regulator-specific remediation text the operator needs to
/// read, so it must never be replaced with a generic message.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The backend answered with an error payload.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The request never completed (connect, timeout, TLS, ...).
    #[error("billing backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 2xx with a body we could not interpret.
    #[error("invalid response payload: {0}")]
    Decode(String),
}

impl CollaboratorError {
    /// Message suitable for the operator, remote text kept intact.
    pub fn operator_message(&self) -> String {
        self.to_string()
    }
}
