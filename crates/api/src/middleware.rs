use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use fieldtrack_auth::{AuthError, SessionSigner, SessionStore};

use crate::app::errors;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub signer: Arc<SessionSigner>,
    pub sessions: Arc<dyn SessionStore>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(unauthorized)?;

    let claims = state
        .signer
        .verify(token, Utc::now())
        .map_err(|e| unauthorized(AuthError::from(e)))?;

    if !state.sessions.exists(claims.sid) {
        return Err(unauthorized(AuthError::UnknownSession));
    }

    let active_owner = state.sessions.current_owner(claims.sid);
    req.extensions_mut()
        .insert(SessionContext::new(claims.sid, active_owner));

    Ok(next.run(req).await)
}

fn unauthorized(err: AuthError) -> Response {
    debug!(error = %err, "request rejected");
    errors::auth_error_to_response(err)
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let header = header.to_str().map_err(|_| AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// One log line per request with status and latency.
pub async fn trace_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = std::time::Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
