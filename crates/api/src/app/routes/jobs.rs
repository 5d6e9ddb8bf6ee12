use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use fieldtrack_jobs::{JobId, JobStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/:id", get(get_job))
        .route("/:id/status", put(set_status))
        .route("/:id/notes", put(set_notes))
        .route("/:id/materials", post(add_material))
        .route("/:id/photos", post(add_photo))
}

fn job_id(raw: &str) -> Result<JobId, axum::response::Response> {
    errors::parse_id(raw, "job")
}

fn parse_status(raw: &str) -> Result<JobStatus, axum::response::Response> {
    raw.parse::<JobStatus>().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: scheduled, in_progress, completed, cancelled",
        )
    })
}

pub async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateJobRequest>,
) -> axum::response::Response {
    match services.create_job(body.fields, body.use_ai_estimate).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::JobQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_status(raw) {
            Ok(s) => Some(s),
            Err(resp) => return resp,
        },
        None => None,
    };

    let jobs = services.list_jobs(status);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "count": jobs.len(),
            "jobs": jobs,
        })),
    )
        .into_response()
}

pub async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match job_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_job(id) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::StatusRequest>,
) -> axum::response::Response {
    let id = match job_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match parse_status(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.set_job_status(id, status) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_notes(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::NotesRequest>,
) -> axum::response::Response {
    let id = match job_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.set_job_notes(id, body.notes) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddMaterialRequest>,
) -> axum::response::Response {
    let id = match job_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let line = match body.into_line() {
        Ok(l) => l,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.add_job_material(id, line, session.active_owner()).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_photo(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddPhotoRequest>,
) -> axum::response::Response {
    let id = match job_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (photo, analyze) = body.into_photo();

    match services.add_job_photo(id, photo, analyze).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
