use axum::Json;
use axum::extract::State;
use serde_json::json;

use super::{ApiResult, err_json};
use crate::app::SharedState;

/// GET /status
pub async fn get_status(State(state): State<SharedState>) -> ApiResult {
    let persisted = state
        .db()
        .count_scheduled_notifications()
        .map_err(|e| err_json(500, &e.to_string()))?;
    let worker = state.worker();
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at(),
        "data_dir": state.data_dir(),
        "worker": {
            "state": worker.state(),
            "cache": worker.config().cache_name,
            "origin": worker.config().origin.as_str(),
            "armed_timers": worker.scheduler().armed(),
            "durable_schedules": worker.scheduler().is_durable(),
        },
        "clients": state.clients().len(),
        "notifications": state.tray().len(),
        "persisted_schedules": persisted,
    })))
}
