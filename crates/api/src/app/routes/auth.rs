use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.password) {
        Ok((sid, token)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "token": token,
                "token_type": "Bearer",
                "session_id": sid.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> StatusCode {
    services.logout(session.session_id());
    StatusCode::NO_CONTENT
}

pub async fn set_owner(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::SetOwnerRequest>,
) -> axum::response::Response {
    match services.set_active_owner(session.session_id(), body.owner_id) {
        Ok(active) => (
            StatusCode::OK,
            Json(serde_json::json!({ "current_owner_id": active.owner_id() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
