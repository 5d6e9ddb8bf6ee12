use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fieldtrack_ai::AiError;
use fieldtrack_auth::AuthError;
use fieldtrack_core::DomainError;
use fieldtrack_infra::LedgerError;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Ledger(e) => ledger_error_to_response(e),
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Auth(e) => auth_error_to_response(e),
        ServiceError::Ai(e) => ai_error_to_response(e),
        ServiceError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "inventory item not found"),
        LedgerError::OwnerIsolation(msg) => json_error(StatusCode::FORBIDDEN, "owner_isolation", msg),
        LedgerError::Store(e) => {
            tracing::error!(error = %e, "ledger store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::OwnerIsolation(msg) => json_error(StatusCode::FORBIDDEN, "owner_isolation", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

fn ai_error_to_response(err: AiError) -> axum::response::Response {
    match err {
        AiError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        AiError::InferenceFailed(msg) | AiError::Internal(msg) => {
            tracing::error!(error = %msg, "ai provider failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "ai_error", msg)
        }
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
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

/// Parse a path id, answering 400 `invalid_id` on failure.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr,
{
    raw.parse::<T>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
