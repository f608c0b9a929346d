//! Uniform JSON error envelope: `{"status": 404, "error": "Not Found", "message": "..."}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warehouse_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        ServiceError::NotFound(what) => json_error(StatusCode::NOT_FOUND, format!("{what} not found")),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "inventory store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal storage error")
        }
    }
}

/// Missing or wrong content type → 415; anything else wrong with the body → 400.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    match rejection {
        JsonRejection::MissingJsonContentType(r) => {
            json_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, r.body_text())
        }
        other => json_error(StatusCode::BAD_REQUEST, other.body_text()),
    }
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    let message = message.into();
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), "{message}");
    } else {
        tracing::warn!(status = status.as_u16(), "{message}");
    }

    (
        status,
        axum::Json(json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Unknown Error"),
            "message": message,
        })),
    )
        .into_response()
}
