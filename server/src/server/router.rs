use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::{api, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state);
    Router::new()
        // --- Core ---
        .route("/status", get(api::status::get_status))
        .route("/ws", get(websocket::ws_handler))
        // --- Worker events ---
        .route("/api/push", post(api::push::push))
        .route("/api/sync/{tag}", post(api::sync::sync))
        // --- Notification tray ---
        .route("/api/notifications", get(api::notifications::list_notifications))
        .route(
            "/api/notifications/{tag}/click",
            post(api::notifications::click_notification),
        )
        // --- Storage ---
        .route("/api/caches", get(api::caches::list_caches))
        .route("/api/schedules", get(api::schedules::list_schedules))
        // --- Settings ---
        .route(
            "/api/settings",
            get(api::settings::get_settings).put(api::settings::update_settings),
        )
        // --- Middleware ---
        .layer(cors)
        .with_state(state)
}

/// Cross-origin requests are accepted only from the worker origin.
fn cors_layer(state: &SharedState) -> CorsLayer {
    let origin = state.worker().config().origin.origin().ascii_serialization();
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE]);
    match HeaderValue::from_str(&origin) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(e) => {
            tracing::warn!("Worker origin {origin:?} is not a valid header, CORS disabled: {e}");
            layer
        }
    }
}
