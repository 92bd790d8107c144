use axum::Json;
use axum::extract::State;
use serde_json::json;

use super::{ApiResult, err_json};
use crate::app::SharedState;

/// GET /api/schedules: persisted schedules plus the number of live timers.
pub async fn list_schedules(State(state): State<SharedState>) -> ApiResult {
    let pending = state
        .db()
        .pending_scheduled_notifications()
        .map_err(|e| err_json(500, &e.to_string()))?;
    let scheduler = state.worker().scheduler();
    Ok(Json(json!({
        "durable": scheduler.is_durable(),
        "armed": scheduler.armed(),
        "pending": pending,
    })))
}
