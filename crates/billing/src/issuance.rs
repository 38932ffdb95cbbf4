//! Issuance state machine.
//!
//! Models the client-visible lifecycle of one electronic-document submission:
//!
//! ```text
//! Idle -> Validating -> Generating -> Signing -> Sending
//!      -> WaitingAuthorization -> Authorized | Pending | Error
//! ```
//!
//! Transitions are strictly forward through the processing chain and are
//! driven only by external signals (local validation outcome, transport
//! progress, the authority's verdict). The machine never advances on its own
//! and never times out; timeout policy belongs to the transport. `Authorized`
//! and `Error` are final. `Pending` is recoverable: an explicit status check
//! re-enters `WaitingAuthorization`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comanda_core::DomainError;

use crate::bill::AccessKey;

/// Transport-reported step of the processing chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    Generating,
    Signing,
    Sending,
    WaitingAuthorization,
}

/// External signal driving the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum IssuanceSignal {
    /// Local validation has started.
    Begin,
    /// The transport reports the next processing step.
    Progress(ProcessingStep),
    /// The authority authorized the document.
    Authorized {
        access_key: AccessKey,
        authorized_at: DateTime<Utc>,
    },
    /// The authority accepted the document but has not yet decided.
    Deferred { access_key: AccessKey },
    /// Validation, transport, or the authority failed. The message is
    /// surfaced verbatim; it may carry regulator remediation text.
    Failed { message: String },
    /// Operator requested a manual status check on a pending document.
    CheckRequested,
}

/// State of one issuance, as bound to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IssuanceState {
    Idle,
    Validating,
    Generating,
    Signing,
    Sending,
    WaitingAuthorization,
    Authorized {
        access_key: AccessKey,
        authorized_at: DateTime<Utc>,
    },
    Pending {
        access_key: AccessKey,
    },
    Error {
        message: String,
    },
}

impl IssuanceState {
    /// Whether a submission is mid-flight. Processing states cannot be
    /// dismissed in the UI, so the operator never mistakes an in-progress
    /// issuance for an abandoned one.
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            IssuanceState::Validating
                | IssuanceState::Generating
                | IssuanceState::Signing
                | IssuanceState::Sending
                | IssuanceState::WaitingAuthorization
        )
    }

    /// Final states. `Pending` counts as terminal-but-recoverable: the flow
    /// is over until the operator explicitly checks status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IssuanceState::Authorized { .. }
                | IssuanceState::Pending { .. }
                | IssuanceState::Error { .. }
        )
    }

    pub fn can_dismiss(&self) -> bool {
        !self.is_processing()
    }

    /// Apply one external signal, yielding the next state.
    ///
    /// Every combination is matched exhaustively; anything not listed as a
    /// legal forward transition is an invariant violation, which makes
    /// skipped steps (e.g. authorization without sending) and backward
    /// transitions (e.g. failure after authorization) unrepresentable at
    /// runtime rather than silently absorbed.
    pub fn advance(&self, signal: IssuanceSignal) -> Result<IssuanceState, DomainError> {
        use IssuanceSignal as S;
        use IssuanceState::*;
        use ProcessingStep as P;

        let next = match (self, signal) {
            (Idle, S::Begin) => Validating,

            // Forward chain, one step at a time.
            (Validating, S::Progress(P::Generating)) => Generating,
            (Generating, S::Progress(P::Signing)) => Signing,
            (Signing, S::Progress(P::Sending)) => Sending,
            (Sending, S::Progress(P::WaitingAuthorization)) => WaitingAuthorization,

            // The verdict only ever lands while waiting on the authority.
            (
                WaitingAuthorization,
                S::Authorized {
                    access_key,
                    authorized_at,
                },
            ) => Authorized {
                access_key,
                authorized_at,
            },
            (WaitingAuthorization, S::Deferred { access_key }) => Pending { access_key },

            // Any processing state may fail.
            (
                Validating | Generating | Signing | Sending | WaitingAuthorization,
                S::Failed { message },
            ) => Error { message },

            // Manual escape hatch from Pending.
            (Pending { .. }, S::CheckRequested) => WaitingAuthorization,

            (state, signal) => {
                return Err(DomainError::invariant(format!(
                    "illegal issuance transition: {state:?} on {signal:?}"
                )));
            }
        };

        Ok(next)
    }
}
