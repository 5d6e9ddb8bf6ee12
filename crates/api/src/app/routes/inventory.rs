use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use fieldtrack_inventory::{InventoryItemId, ItemFields};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/audit", get(audit_trail))
        .route("/:id", get(get_item).patch(update_item).delete(delete_item))
        .route("/:id/adjust", post(adjust_item))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<dto::InventoryQuery>,
) -> axum::response::Response {
    let filter = query.into_filter();
    match services.list_items(session.active_owner(), &filter).await {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "current_owner_id": session.active_owner().owner_id(),
                "count": items.len(),
                "items": items,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<ItemFields>,
) -> axum::response::Response {
    match services.create_item(body, session.active_owner()).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InventoryItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_item(id, session.active_owner()).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<ItemFields>,
) -> axum::response::Response {
    let id: InventoryItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_item(id, body, session.active_owner()).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn adjust_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustRequest>,
) -> axum::response::Response {
    let id: InventoryItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let adjustment = match body.adjustment() {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.adjust_item(id, adjustment, session.active_owner()).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InventoryItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete_item(id, session.active_owner()).await {
        Ok(audit) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "deleted": audit.item_id,
                "audit": audit,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn audit_trail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<dto::AuditQuery>,
) -> axum::response::Response {
    let item_id: Option<InventoryItemId> = match query.item_id.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => match errors::parse_id(raw, "item") {
            Ok(v) => Some(v),
            Err(resp) => return resp,
        },
        None => None,
    };

    match services.audit_trail(session.active_owner(), item_id).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": entries.len(),
                "entries": entries,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
