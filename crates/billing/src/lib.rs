//! Billing domain module.
//!
//! Everything the client side of electronic invoicing needs to reason about
//! locally: the bill record as persisted by the billing backend, the issuance
//! state machine the UI binds to, tax arithmetic, credit-note reason codes,
//! and the pre-network validation rules (final-consumer sentinel, warning
//! thresholds, credit-note eligibility).
//!
//! The actual XML generation, signing, and authority round trip are owned by
//! the billing backend; this crate never performs IO.

pub mod bill;
pub mod credit_note;
pub mod details;
pub mod document;
pub mod issuance;
pub mod tax;

pub use bill::{AccessKey, Bill, BillId, Environment, SriStatus};
pub use credit_note::{CreditNoteRequest, ReasonCode};
pub use details::{
    BillingDetails, IssueWarning, FINAL_CONSUMER_ID, FINAL_CONSUMER_THRESHOLD_CENTS,
};
pub use document::DocumentNumber;
pub use issuance::{IssuanceSignal, IssuanceState, ProcessingStep};
pub use tax::{split_total, TaxBreakdown};
