use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const SCAN_CONTEXT: &str = "Analyze inventory image";

pub fn router() -> Router {
    Router::new()
        .route("/estimate", post(estimate))
        .route("/analyze-photo", post(analyze_photo))
        .route("/scan-inventory", post(scan_inventory))
        .route("/suggest-schedule", post(suggest_schedule))
        .route("/help", post(help))
}

pub async fn estimate(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::EstimateRequest>,
) -> axum::response::Response {
    let Some(description) = body.description.as_deref().filter(|d| !d.trim().is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "description is required");
    };
    let address = body
        .address
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or("Unknown address");

    match services.estimate(description, address).await {
        Ok(r) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "estimate": r.text,
                "provider": r.provider,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn analyze_photo(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PhotoRequest>,
) -> axum::response::Response {
    let context = body.context.clone().unwrap_or_default();
    photo_analysis(&services, body, &context).await
}

pub async fn scan_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PhotoRequest>,
) -> axum::response::Response {
    photo_analysis(&services, body, SCAN_CONTEXT).await
}

async fn photo_analysis(services: &AppServices, body: dto::PhotoRequest, context: &str) -> axum::response::Response {
    let Some(photo_data) = body.photo_data.as_deref().filter(|p| !p.trim().is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "photo_data is required");
    };

    match services.analyze_photo(photo_data, context).await {
        Ok(r) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "analysis": r.text,
                "provider": r.provider,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn suggest_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ScheduleRequest>,
) -> axum::response::Response {
    let address = body.address.unwrap_or_default();
    match services.suggest_schedule(&address).await {
        Ok(r) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "suggestion": r.text,
                "provider": r.provider,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn help(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::HelpRequest>,
) -> axum::response::Response {
    let Some(question) = body.question.as_deref().filter(|q| !q.trim().is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "question is required");
    };

    match services.answer_question(question).await {
        Ok(r) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "answer": r.text,
                "provider": r.provider,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
