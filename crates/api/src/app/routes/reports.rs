use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/summary", get(summary))
        .route("/download_today", get(download_today))
}

pub async fn dashboard(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.dashboard())
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services.summary(session.active_owner()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// End-of-shift report as a plain-text attachment.
pub async fn download_today(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> impl IntoResponse {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let report = services.end_of_shift_report(date);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"end_of_shift_{}.txt\"", date.format("%Y-%m-%d")),
            ),
        ],
        report,
    )
}
