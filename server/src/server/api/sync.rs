use axum::Json;
use axum::extract::{Path, State};
use serde_json::json;
use worker_core::WorkerEvent;
use worker_core::worker::Dispatched;

use super::{ApiResult, err_json, worker_err};
use crate::app::SharedState;

/// POST /api/sync/{tag}: fire a background-sync event.
pub async fn sync(State(state): State<SharedState>, Path(tag): Path<String>) -> ApiResult {
    match state.dispatch(WorkerEvent::Sync(tag.clone())) {
        Ok(Dispatched::Synced { notified }) => Ok(Json(json!({
            "status": "ok",
            "tag": tag,
            "notified": notified,
        }))),
        Ok(other) => Err(err_json(500, &format!("unexpected dispatch result: {other:?}"))),
        Err(e) => Err(worker_err(&e)),
    }
}
