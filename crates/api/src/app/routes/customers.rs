use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use fieldtrack_customers::{CustomerFields, CustomerId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).patch(update_customer).delete(delete_customer))
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CustomerFields>,
) -> axum::response::Response {
    match services.create_customer(body) {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let customers = services.list_customers(search);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "count": customers.len(),
            "customers": customers,
        })),
    )
        .into_response()
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match errors::parse_id(&id, "customer") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_customer(id) {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<CustomerFields>,
) -> axum::response::Response {
    let id: CustomerId = match errors::parse_id(&id, "customer") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_customer(id, body) {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match errors::parse_id(&id, "customer") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete_customer(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
