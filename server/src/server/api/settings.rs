//! Settings management API:
//!   GET /api/settings: all settings + feature status
//!   PUT /api/settings: validate and store a batch of settings
//!
//! `WINDOW_OPEN_COMMAND` and `SERVER_BIND_ADDRESS` are environment-only
//! and rejected here.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use super::{ApiResult, err_json};
use crate::app::SharedState;
use crate::config::SettingsManager;

/// GET /api/settings
pub async fn get_settings(State(state): State<SharedState>) -> ApiResult {
    let sm = SettingsManager::new(state.db().clone());
    let opener = state.config().await.window_opener_configured();
    settings_response(&sm, opener, None)
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<HashMap<String, String>>,
) -> ApiResult {
    let sm = SettingsManager::new(state.db().clone());
    sm.set_settings(&body)
        .map_err(|e| err_json(400, &e.to_string()))?;

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;

    // The worker and the listener read their settings only at startup.
    let restart_required = !body.is_empty();
    tracing::info!(updated = body.len(), restart_required, "Settings updated");
    let opener = state.config().await.window_opener_configured();
    settings_response(&sm, opener, Some(json!({ "updated": body.len(), "restart_required": restart_required })))
}

fn settings_response(sm: &SettingsManager, window_opener: bool, extra: Option<Value>) -> ApiResult {
    let all = sm
        .get_all_settings()
        .map_err(|e| err_json(500, &format!("Failed to get settings: {e}")))?;
    let status = sm
        .check_feature_status(window_opener)
        .map_err(|e| err_json(500, &format!("Failed to check status: {e}")))?;

    let mut response = json!({
        "settings": all,
        "status": status,
    });
    if let (Some(Value::Object(extra)), Some(obj)) = (extra, response.as_object_mut()) {
        obj.extend(extra);
    }
    Ok(Json(response))
}
