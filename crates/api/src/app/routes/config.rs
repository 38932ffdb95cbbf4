use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use comanda_config::RestaurantConfigPatch;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_config).patch(update_config))
        .route("/next-numbers", get(next_numbers))
}

/// Current configuration (cached; fetched once if the cache is empty).
pub async fn get_config(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.engine.config().current_or_fetch().await {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => errors::collaborator_error_to_response(e),
    }
}

/// Partial update; nested sub-objects are merged, never replaced wholesale.
pub async fn update_config(
    Extension(services): Extension<Arc<AppServices>>,
    Json(patch): Json<RestaurantConfigPatch>,
) -> axum::response::Response {
    match services.engine.config().update(&patch).await {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => errors::collaborator_error_to_response(e),
    }
}

/// Display-only estimates of the next document numbers (`current + 1`).
/// The authoritative increment always happens server-side.
pub async fn next_numbers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let config = match services.engine.config().current_or_fetch().await {
        Ok(config) => config,
        Err(e) => return errors::collaborator_error_to_response(e),
    };

    let invoice = match config.billing.next_invoice_number() {
        Ok(number) => number,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let credit_note = match config.billing.next_credit_note_number() {
        Ok(number) => number,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "invoice": invoice.to_string(),
            "creditNote": credit_note.to_string(),
        })),
    )
        .into_response()
}
