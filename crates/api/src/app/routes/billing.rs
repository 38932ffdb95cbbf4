use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use comanda_billing::{AccessKey, CreditNoteRequest, ReasonCode};
use comanda_client::ListBillsParams;
use comanda_engine::NullObserver;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/invoices", post(issue_invoice).get(list_bills))
        .route("/invoices/preflight", post(preflight))
        .route("/invoices/status-check", post(check_status))
        .route("/credit-notes", post(issue_credit_note))
        .route("/reset", post(reset_system))
}

/// Validation + advisory warnings, without touching the collaborator.
pub async fn preflight(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::IssueInvoiceRequest>,
) -> axum::response::Response {
    let order = match dto::build_order(&body.order) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let details = dto::billing_details(&body.client);

    match services.engine.preflight(&order, &details) {
        Ok(warnings) => (
            StatusCode::OK,
            Json(dto::PreflightResponse { warnings }),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// Issue an electronic invoice. The response body is the terminal issuance
/// outcome; authority rejection arrives as the `error` state with the
/// authority's message verbatim.
pub async fn issue_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::IssueInvoiceRequest>,
) -> axum::response::Response {
    let order = match dto::build_order(&body.order) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let details = dto::billing_details(&body.client);

    match services
        .engine
        .issue(&order, &details, body.tax_rate, body.logo_url.clone(), &NullObserver)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// Manual status check for a pending document.
pub async fn check_status(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CheckStatusRequest>,
) -> axum::response::Response {
    let access_key = AccessKey::new(body.access_key);
    match services.engine.check_status(&access_key, &NullObserver).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBillsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub identification: Option<String>,
    pub document_number: Option<String>,
}

/// Paged bill history, proxied from the billing backend.
pub async fn list_bills(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListBillsQuery>,
) -> axum::response::Response {
    let params = ListBillsParams {
        page: query.page,
        limit: query.limit,
        identification: query.identification,
        document_number: query.document_number,
    };

    match services.billing.list_bills(&params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::collaborator_error_to_response(e),
    }
}

/// Cancel an authorized bill with a credit note.
pub async fn issue_credit_note(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreditNoteRequestDto>,
) -> axum::response::Response {
    let reason = match ReasonCode::from_code(&body.reason_code) {
        Ok(reason) => reason,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let request = CreditNoteRequest {
        bill_id: body.bill.id,
        reason,
        description: body.description.clone(),
        tax_rate: body.tax_rate,
    };

    match services.engine.issue_credit_note(&body.bill, &request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// Destructive billing-system wipe, gated on the typed confirmation phrase.
pub async fn reset_system(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetRequest>,
) -> axum::response::Response {
    match services.engine.reset_system(&body.confirmation).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}
