//! Invoice issuance orchestration.
//!
//! Coordinates the conversion of a completed order plus client-supplied
//! billing data into an authorized bill: local validation, the collaborator
//! round trip, response classification into the issuance state machine, and
//! the post-success configuration refresh. The refresh completes while the
//! in-flight reservation is still held, so the next issuance never sees a
//! stale sequence display.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use comanda_billing::{
    split_total, AccessKey, BillId, BillingDetails, IssuanceSignal, IssuanceState, IssueWarning,
    ProcessingStep, SriStatus,
};
use comanda_client::{
    ClientPayload, CollaboratorError, GenerateInvoiceRequest, GenerateInvoiceResponse,
    IssuanceProgress, OrderItemPayload, OrderPayload, StatusSnapshot,
};
use comanda_core::DomainError;
use comanda_orders::Order;
use serde::Serialize;

use crate::error::EngineError;
use crate::BillingEngine;

/// Receives every state change of one issuance. The UI binds its modal to
/// this; `IssuanceState::can_dismiss` tells it when closing is allowed.
pub trait IssuanceObserver: Send + Sync {
    fn state_changed(&self, state: &IssuanceState);
}

/// Observer that ignores every state change.
pub struct NullObserver;

impl IssuanceObserver for NullObserver {
    fn state_changed(&self, _state: &IssuanceState) {}
}

/// Data needed to print the authorized document (RIDE header).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintReceipt {
    pub access_key: AccessKey,
    pub authorized_at: chrono::DateTime<Utc>,
}

/// Final result of an issuance or status check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceOutcome {
    /// Terminal machine state: `Authorized`, `Pending`, or `Error`.
    #[serde(flatten)]
    pub state: IssuanceState,
    pub bill_id: Option<BillId>,
    pub receipt: Option<PrintReceipt>,
}

/// The issuance state machine plus its observer, shared with the transport
/// as a progress sink. Signals that would be illegal transitions are logged
/// and dropped rather than corrupting the flow; the machine itself stays the
/// single source of truth.
struct Machine<'a> {
    state: Mutex<IssuanceState>,
    observer: &'a dyn IssuanceObserver,
}

impl<'a> Machine<'a> {
    fn new(initial: IssuanceState, observer: &'a dyn IssuanceObserver) -> Self {
        Self {
            state: Mutex::new(initial),
            observer,
        }
    }

    fn current(&self) -> IssuanceState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn signal(&self, signal: IssuanceSignal) -> Result<IssuanceState, DomainError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let next = state.advance(signal)?;
        *state = next.clone();
        drop(state);
        self.observer.state_changed(&next);
        Ok(next)
    }

    fn fail(&self, message: String) {
        if let Err(err) = self.signal(IssuanceSignal::Failed { message }) {
            tracing::warn!(error = %err, "could not record issuance failure");
        }
    }

    /// Walk any remaining processing steps up to `WaitingAuthorization`.
    /// Collaborators normally report each step; this tolerates ones that
    /// answer without reporting progress, so a verdict never arrives in a
    /// state that cannot accept it.
    fn ensure_waiting(&self) {
        loop {
            let step = match self.current() {
                IssuanceState::Validating => ProcessingStep::Generating,
                IssuanceState::Generating => ProcessingStep::Signing,
                IssuanceState::Signing => ProcessingStep::Sending,
                IssuanceState::Sending => ProcessingStep::WaitingAuthorization,
                _ => return,
            };
            if self.signal(IssuanceSignal::Progress(step)).is_err() {
                return;
            }
        }
    }
}

impl IssuanceProgress for Machine<'_> {
    fn step(&self, step: ProcessingStep) {
        if let Err(err) = self.signal(IssuanceSignal::Progress(step)) {
            tracing::warn!(error = %err, ?step, "ignoring out-of-order progress signal");
        }
    }
}

impl BillingEngine {
    /// Pre-issuance check: hard validation first, then the advisory warnings
    /// the operator must see (final-consumer cap, missing email). Warnings
    /// never block; whether to proceed is the operator's call.
    pub fn preflight(
        &self,
        order: &Order,
        details: &BillingDetails,
    ) -> Result<Vec<IssueWarning>, EngineError> {
        validate_for_issuance(order, details)?;
        Ok(details.warnings(order.total()))
    }

    /// Issue an electronic invoice for `order`.
    ///
    /// Returns `Ok` with a terminal [`IssuanceOutcome`] when the exchange
    /// completed, including authority rejection, which classifies into the
    /// `Error` state with the authority's message verbatim. Returns `Err`
    /// for local validation failures, duplicate in-flight operations, and
    /// transport-level collaborator failures.
    ///
    /// Never mutates the order: marking it billed follows from the backend's
    /// persisted response, not from this call.
    pub async fn issue(
        &self,
        order: &Order,
        details: &BillingDetails,
        tax_rate: u8,
        logo_url: Option<String>,
        observer: &dyn IssuanceObserver,
    ) -> Result<IssuanceOutcome, EngineError> {
        let _guard = self.in_flight.try_acquire(&order.id_typed().to_string())?;

        let machine = Machine::new(IssuanceState::Idle, observer);
        machine.signal(IssuanceSignal::Begin)?;

        if let Err(err) = validate_for_issuance(order, details) {
            machine.fail(err.to_string());
            return Err(err.into());
        }

        let total = order.total();
        let breakdown = split_total(total, tax_rate);
        let request = GenerateInvoiceRequest {
            order: OrderPayload {
                id: order.id_typed(),
                order_number: order.order_number().map(str::to_string),
                items: order
                    .items()
                    .iter()
                    .map(|item| OrderItemPayload {
                        name: item.name.clone(),
                        quantity: item.quantity,
                        unit_price: item.unit_price,
                    })
                    .collect(),
                subtotal: breakdown.subtotal,
                tax: breakdown.tax,
                total,
            },
            client: ClientPayload {
                identification: details.identification.clone(),
                name: details.name.clone(),
                address: details.address.clone(),
                email: details.email.clone(),
            },
            tax_rate,
            logo_url,
        };

        tracing::info!(order_id = %order.id_typed(), total, "submitting invoice for authorization");

        let response = match self.billing.generate_invoice(&request, &machine).await {
            Ok(response) => response,
            Err(err) => {
                machine.fail(err.operator_message());
                return Err(err.into());
            }
        };

        machine.ensure_waiting();
        let outcome = classify_response(response, &machine)?;

        // A consumed sequence number means the displayed "next number" is
        // stale. Refresh while the in-flight reservation is still held so a
        // follow-up issuance cannot start against the old counter.
        if issuance_consumed_sequence(&outcome.state) {
            if let Err(err) = self.sync.refresh().await {
                tracing::warn!(error = %err, "config refresh after issuance failed");
            }
        }

        Ok(outcome)
    }

    /// Manual status check for a document left in `Pending`.
    ///
    /// Re-enters `WaitingAuthorization` and resolves to `Authorized`, stays
    /// `Pending`, or classifies an authority rejection into `Error`. Never
    /// called automatically: polling the authority is explicitly the
    /// operator's decision.
    pub async fn check_status(
        &self,
        access_key: &AccessKey,
        observer: &dyn IssuanceObserver,
    ) -> Result<IssuanceOutcome, EngineError> {
        let _guard = self.in_flight.try_acquire(access_key.as_str())?;

        let machine = Machine::new(
            IssuanceState::Pending {
                access_key: access_key.clone(),
            },
            observer,
        );
        machine.signal(IssuanceSignal::CheckRequested)?;

        let snapshot = match self.billing.check_status(access_key).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                machine.fail(err.operator_message());
                return Err(err.into());
            }
        };

        classify_snapshot(snapshot, access_key, &machine)
    }
}

fn validate_for_issuance(order: &Order, details: &BillingDetails) -> Result<(), DomainError> {
    details.validate()?;
    if !order.has_items() {
        return Err(DomainError::validation("cannot bill an order without items"));
    }
    if order.is_billed() {
        return Err(DomainError::conflict("order is already billed"));
    }
    Ok(())
}

/// Whether the backend consumed a sequence number for this outcome.
/// Authorized and accepted-but-pending documents both did.
fn issuance_consumed_sequence(state: &IssuanceState) -> bool {
    matches!(
        state,
        IssuanceState::Authorized { .. } | IssuanceState::Pending { .. }
    )
}

/// Classify the generation response into exactly one terminal state.
fn classify_response(
    response: GenerateInvoiceResponse,
    machine: &Machine<'_>,
) -> Result<IssuanceOutcome, EngineError> {
    let bill_id = response.invoice_id;
    let sri = response.sri_response.unwrap_or_default();

    match sri.estado {
        Some(SriStatus::Autorizado) => {
            let Some(access_key) = response.access_key else {
                let message = "backend reported authorization without an access key".to_string();
                machine.fail(message.clone());
                return Err(CollaboratorError::Decode(message).into());
            };
            // The authority decided synchronously; if it omitted the
            // timestamp, receipt time is the closest honest value.
            let authorized_at = sri.fecha_autorizacion.unwrap_or_else(Utc::now);
            let state = machine.signal(IssuanceSignal::Authorized {
                access_key: access_key.clone(),
                authorized_at,
            })?;
            Ok(IssuanceOutcome {
                state,
                bill_id,
                receipt: Some(PrintReceipt {
                    access_key,
                    authorized_at,
                }),
            })
        }

        Some(status) if status.is_open() => {
            let Some(access_key) = response.access_key else {
                let message =
                    "backend accepted the document without returning an access key".to_string();
                machine.fail(message.clone());
                return Err(CollaboratorError::Decode(message).into());
            };
            let state = machine.signal(IssuanceSignal::Deferred { access_key })?;
            Ok(IssuanceOutcome {
                state,
                bill_id,
                receipt: None,
            })
        }

        Some(status) => {
            // NO AUTORIZADO / DEVUELTA / CANCELADA: authority rejection.
            // Surfaced verbatim and never retried.
            let message = sri
                .mensaje
                .unwrap_or_else(|| format!("documento {status}"));
            machine.fail(message.clone());
            Ok(IssuanceOutcome {
                state: IssuanceState::Error { message },
                bill_id,
                receipt: None,
            })
        }

        None if response.success => match response.access_key {
            // Accepted, no verdict attached: recoverable pending.
            Some(access_key) => {
                let state = machine.signal(IssuanceSignal::Deferred { access_key })?;
                Ok(IssuanceOutcome {
                    state,
                    bill_id,
                    receipt: None,
                })
            }
            None => {
                let message =
                    "backend accepted the document without returning an access key".to_string();
                machine.fail(message.clone());
                Err(CollaboratorError::Decode(message).into())
            }
        },

        None => {
            let message = sri
                .mensaje
                .unwrap_or_else(|| "the billing backend did not accept the document".to_string());
            machine.fail(message.clone());
            Ok(IssuanceOutcome {
                state: IssuanceState::Error { message },
                bill_id,
                receipt: None,
            })
        }
    }
}

/// Classify a manual status-check snapshot.
fn classify_snapshot(
    snapshot: StatusSnapshot,
    access_key: &AccessKey,
    machine: &Machine<'_>,
) -> Result<IssuanceOutcome, EngineError> {
    match snapshot.sri_status {
        SriStatus::Autorizado => {
            let authorized_at = snapshot.authorized_at.unwrap_or_else(Utc::now);
            let state = machine.signal(IssuanceSignal::Authorized {
                access_key: access_key.clone(),
                authorized_at,
            })?;
            Ok(IssuanceOutcome {
                state,
                bill_id: None,
                receipt: Some(PrintReceipt {
                    access_key: access_key.clone(),
                    authorized_at,
                }),
            })
        }
        status if status.is_open() => {
            let state = machine.signal(IssuanceSignal::Deferred {
                access_key: access_key.clone(),
            })?;
            Ok(IssuanceOutcome {
                state,
                bill_id: None,
                receipt: None,
            })
        }
        status => {
            let message = snapshot
                .message
                .unwrap_or_else(|| format!("documento {status}"));
            machine.fail(message.clone());
            Ok(IssuanceOutcome {
                state: IssuanceState::Error { message },
                bill_id: None,
                receipt: None,
            })
        }
    }
}
