//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring and the orchestration handlers call into
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and query mapping
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use fieldtrack_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config).await?);
    let auth_state = middleware::AuthState {
        signer: services.signer(),
        sessions: services.sessions(),
    };

    // Protected routes: require a valid session token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::auth::login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        ))
}
