//! REST API handlers grouped by domain.

pub mod caches;
pub mod notifications;
pub mod push;
pub mod schedules;
pub mod settings;
pub mod status;
pub mod sync;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};
use worker_core::{PlatformError, WorkerError};

pub type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Map a worker failure onto an HTTP status.
pub fn worker_err(e: &WorkerError) -> (StatusCode, Json<Value>) {
    let status = match e {
        WorkerError::InvalidMessage(_) | WorkerError::Json(_) => 400,
        WorkerError::Platform(PlatformError::PermissionDenied) => 403,
        WorkerError::Platform(PlatformError::ClientNotFound(_)) => 404,
        _ => 500,
    };
    err_json(status, &e.to_string())
}
