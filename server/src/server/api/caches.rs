use axum::Json;
use axum::extract::State;
use serde_json::json;

use super::{ApiResult, err_json};
use crate::app::SharedState;

/// GET /api/caches
pub async fn list_caches(State(state): State<SharedState>) -> ApiResult {
    let current = state.worker().config().cache_name.clone();
    let caches = state
        .db()
        .list_cache_namespaces()
        .map_err(|e| err_json(500, &e.to_string()))?;
    let caches: Vec<_> = caches
        .into_iter()
        .map(|c| {
            json!({
                "name": c.name,
                "created_at": c.created_at,
                "current": c.name == current,
            })
        })
        .collect();
    Ok(Json(json!({ "current": current, "caches": caches })))
}
