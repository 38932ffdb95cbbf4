//! HTTP collaborator contract.
//!
//! The billing backend (and behind it the tax authority) is an external
//! collaborator reached over HTTP. This crate defines the consumed contract
//! ([`BillingService`] and [`ConfigApi`] traits plus the wire DTOs) and the
//! reqwest-backed implementations. Nothing in here makes billing decisions;
//! that is the engine's job.

pub mod dto;
pub mod error;
pub mod http;
pub mod service;

pub use dto::{
    BillPage, ClientPayload, CreditNotePayload, GenerateInvoiceRequest, GenerateInvoiceResponse,
    ListBillsParams, OrderItemPayload, OrderPayload, Pagination, SriResponsePayload,
    StatusSnapshot,
};
pub use error::CollaboratorError;
pub use http::{HttpBillingService, HttpConfigApi};
pub use service::{BillingService, ConfigApi, IssuanceProgress, NoProgress};
