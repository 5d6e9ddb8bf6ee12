use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use fieldtrack_materials::MaterialFields;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_materials).post(create_material))
}

pub async fn create_material(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<MaterialFields>,
) -> axum::response::Response {
    match services.create_material(body) {
        Ok(material) => (StatusCode::CREATED, Json(material)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_materials(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let materials = services.list_materials();
    Json(serde_json::json!({
        "count": materials.len(),
        "materials": materials,
    }))
}
