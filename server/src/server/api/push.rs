//! POST /api/push: deliver a push message to the worker. The raw request body
//! is the push payload; an empty body is a push without data.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Value, json};
use worker_core::WorkerEvent;
use worker_core::push::{PayloadStatus, PushEvent};
use worker_core::worker::Dispatched;

use super::{ApiResult, err_json, worker_err};
use crate::app::SharedState;

pub async fn push(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    let event = if body.is_empty() {
        PushEvent::empty()
    } else {
        PushEvent::with_body(body.to_vec())
    };

    match state.dispatch(WorkerEvent::Push(event)) {
        Ok(Dispatched::Pushed(delivery)) => Ok(Json(json!({
            "status": "ok",
            "payload": payload_json(&delivery.payload),
            "notification": delivery.notification,
        }))),
        Ok(other) => Err(err_json(500, &format!("unexpected dispatch result: {other:?}"))),
        Err(e) => Err(worker_err(&e)),
    }
}

fn payload_json(status: &PayloadStatus) -> Value {
    match status {
        PayloadStatus::Absent => json!({ "state": "absent" }),
        PayloadStatus::Applied => json!({ "state": "applied" }),
        PayloadStatus::Malformed(error) => json!({ "state": "malformed", "error": error }),
    }
}
