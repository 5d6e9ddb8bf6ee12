use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "session_id": session.session_id().to_string(),
        "current_owner_id": session.active_owner().owner_id(),
    }))
}
