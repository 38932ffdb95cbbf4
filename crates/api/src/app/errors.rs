use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use comanda_client::CollaboratorError;
use comanda_core::DomainError;
use comanda_engine::EngineError;

pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match err {
        EngineError::Domain(e) => domain_error_to_response(e),
        EngineError::Collaborator(e) => collaborator_error_to_response(e),
        EngineError::AlreadyInFlight(key) => json_error(
            StatusCode::CONFLICT,
            "operation_in_flight",
            format!("a billing operation is already in flight for {key}"),
        ),
        EngineError::ConfirmationMismatch => json_error(
            StatusCode::FORBIDDEN,
            "confirmation_mismatch",
            "confirmation phrase does not match",
        ),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

/// Collaborator failures map to 502: the backend (or the authority behind
/// it) failed, not this service. The remote message rides along verbatim;
/// it may carry regulator remediation text the operator needs.
pub fn collaborator_error_to_response(err: CollaboratorError) -> axum::response::Response {
    json_error(
        StatusCode::BAD_GATEWAY,
        "collaborator_error",
        err.operator_message(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
