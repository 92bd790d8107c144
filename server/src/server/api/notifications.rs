//! Notification tray API:
//!   GET  /api/notifications: notifications currently displayed
//!   POST /api/notifications/{tag}/click: click one (optional `{"action": ...}` body)

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;

use super::{ApiResult, err_json, worker_err};
use crate::app::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct ClickBody {
    #[serde(default)]
    pub action: Option<String>,
}

/// GET /api/notifications
pub async fn list_notifications(State(state): State<SharedState>) -> ApiResult {
    let notifications = state.tray().list();
    Ok(Json(json!({
        "count": notifications.len(),
        "notifications": notifications,
    })))
}

/// POST /api/notifications/{tag}/click
pub async fn click_notification(
    State(state): State<SharedState>,
    Path(tag): Path<String>,
    body: Bytes,
) -> ApiResult {
    let click: ClickBody = if body.is_empty() {
        ClickBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| err_json(400, &format!("invalid body: {e}")))?
    };

    match state.click_notification(&tag, click.action) {
        Ok(Some(outcome)) => Ok(Json(json!({ "status": "ok", "result": outcome }))),
        Ok(None) => Err(err_json(404, &format!("no displayed notification with tag {tag}"))),
        Err(e) => Err(worker_err(&e)),
    }
}
