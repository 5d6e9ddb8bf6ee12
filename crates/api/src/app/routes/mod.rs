use axum::{
    routing::{get, post, put},
    Router,
};

pub mod ai;
pub mod auth;
pub mod customers;
pub mod inventory;
pub mod jobs;
pub mod materials;
pub mod reports;
pub mod system;

/// Router for all authenticated (session-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/logout", post(auth::logout))
        .route("/session/owner", put(auth::set_owner))
        .nest("/inventory", inventory::router())
        .nest("/customers", customers::router())
        .nest("/materials", materials::router())
        .nest("/jobs", jobs::router())
        .nest("/reports", reports::router())
        .nest("/api/ai", ai::router())
}
