use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::Json,
};
use fieldtrack_core::CoreError;
use serde_json::json;

pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "code": "INVALID_INPUT", "error": message.into() })))
}

/// Malformed bodies, paths and query strings are invalid input like any other.
pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected JSON body: {}", rejection.body_text());
    bad_request(rejection.body_text())
}

pub fn path_rejection(rejection: PathRejection) -> ApiError {
    bad_request(rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> ApiError {
    bad_request(rejection.body_text())
}

pub fn internal() -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "code": "STORAGE_ERROR", "error": "Storage error" })))
}

pub fn from_core(err: CoreError) -> ApiError {
    match err {
        CoreError::InvalidInput(message) => bad_request(message),
        CoreError::Blocked(pending) => (
            StatusCode::CONFLICT,
            Json(json!({
                "code": "FOLLOWUP_PENDING",
                "error": "Record feedback for today's follow-ups before starting a new visit",
                "pending": pending,
            })),
        ),
        CoreError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "NOT_FOUND", "error": format!("No visit record with id {id}") })),
        ),
        err @ CoreError::InvalidAction { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": "INVALID_ACTION", "error": err.to_string() })),
        ),
        CoreError::Storage(e) => {
            tracing::error!("Storage error: {:?}", e);
            internal()
        }
    }
}
