use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use warehouse_inventory::{InventoryFilter, InventoryKey, InventoryRecord};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route(
            "/:product_id/condition/:condition",
            get(get_inventory).put(update_inventory).delete(delete_inventory),
        )
        .route("/:product_id/condition/:condition/activate", put(activate_inventory))
        .route("/:product_id/condition/:condition/deactivate", put(deactivate_inventory))
}

fn parse_key(product_id: &str, condition: &str) -> Result<InventoryKey, axum::response::Response> {
    InventoryKey::parse(product_id, condition)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, e.to_string()))
}

pub async fn list_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    let filter = match InventoryFilter::from_params(params) {
        Ok(f) => f,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match services.inventory().list(&filter).await {
        Ok(records) => {
            tracing::info!(count = records.len(), "Returning inventories");
            Json(records).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateInventoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.inventory().create(InventoryRecord::from(body)).await {
        Ok(created) => (
            StatusCode::CREATED,
            [(header::LOCATION, dto::location_for(&created))],
            Json(created),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, condition)): Path<(String, String)>,
) -> axum::response::Response {
    let key = match parse_key(&product_id, &condition) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match services.inventory().get(key).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, condition)): Path<(String, String)>,
    query: Result<Query<dto::UpdateQuery>, QueryRejection>,
    body: Result<Json<dto::UpdateInventoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let key = match parse_key(&product_id, &condition) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    // A missing record is reported before anything is read from the request.
    if let Err(e) = services.inventory().get(key).await {
        return errors::service_error_to_response(e);
    }
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let update = match dto::resolve_update(&query, &body) {
        Ok(u) => u,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match services.inventory().update(key, update).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, condition)): Path<(String, String)>,
) -> axum::response::Response {
    let key = match parse_key(&product_id, &condition) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match services.inventory().delete(key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn activate_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, condition)): Path<(String, String)>,
) -> axum::response::Response {
    let key = match parse_key(&product_id, &condition) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match services.inventory().activate(key).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn deactivate_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, condition)): Path<(String, String)>,
) -> axum::response::Response {
    let key = match parse_key(&product_id, &condition) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match services.inventory().deactivate(key).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
