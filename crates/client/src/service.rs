//! Consumed service contracts.

use async_trait::async_trait;

use comanda_billing::{AccessKey, ProcessingStep};
use comanda_config::{RestaurantConfig, RestaurantConfigPatch};

use crate::dto::{
    BillPage, CreditNotePayload, GenerateInvoiceRequest, GenerateInvoiceResponse, ListBillsParams,
    StatusSnapshot,
};
use crate::error::CollaboratorError;

/// Sink for transport progress during invoice generation.
///
/// The issuance state machine only moves on external signals; the transport
/// reports each stage of the round trip through this sink so the engine can
/// advance the machine one step at a time.
pub trait IssuanceProgress: Send + Sync {
    fn step(&self, step: ProcessingStep);
}

/// Progress sink that discards every step.
pub struct NoProgress;

impl IssuanceProgress for NoProgress {
    fn step(&self, _step: ProcessingStep) {}
}

/// The billing backend, including the authority interaction it owns.
///
/// Consumed, not implemented here: XML generation, signing, and the
/// authority round trip all happen server-side. Every method is a single
/// request/response exchange; once a generation request is sent it is seen
/// through to completion or failure. There is no cancellation, because a
/// partially submitted document could leave an unresolvable record on the
/// authority side.
#[async_trait]
pub trait BillingService: Send + Sync {
    /// Generate, sign, and submit an invoice for authorization.
    async fn generate_invoice(
        &self,
        request: &GenerateInvoiceRequest,
        progress: &dyn IssuanceProgress,
    ) -> Result<GenerateInvoiceResponse, CollaboratorError>;

    /// Issue a credit note cancelling a previously authorized bill.
    async fn generate_credit_note(
        &self,
        request: &CreditNotePayload,
    ) -> Result<(), CollaboratorError>;

    /// Manually check the authority status of a submitted document.
    async fn check_status(
        &self,
        access_key: &AccessKey,
    ) -> Result<StatusSnapshot, CollaboratorError>;

    /// Paged bill history, filterable by identification / document number.
    async fn list_bills(&self, params: &ListBillsParams) -> Result<BillPage, CollaboratorError>;

    /// Destructive: purge all bills and credit notes, reset sequence
    /// counters, unmark billed orders. The caller is responsible for the
    /// typed-confirmation gate; this method just executes.
    async fn reset_system(&self) -> Result<(), CollaboratorError>;
}

/// The backend's configuration endpoint.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    async fn get(&self) -> Result<RestaurantConfig, CollaboratorError>;

    /// Partial update; nested sub-objects are merged server-side, mirroring
    /// [`RestaurantConfig::merge`].
    async fn update(
        &self,
        patch: &RestaurantConfigPatch,
    ) -> Result<RestaurantConfig, CollaboratorError>;
}
