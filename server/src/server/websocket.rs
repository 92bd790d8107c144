use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use worker_core::WorkerEvent;
use worker_core::message::message_type;

use crate::app::SharedState;
use crate::events;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// URL of the connecting page, relative to the worker origin.
    #[serde(default)]
    pub url: Option<String>,
}

/// `NOTIFICATION_CLICK` sent by a page.
#[derive(Debug, Deserialize)]
struct ClickMessage {
    tag: String,
    #[serde(default)]
    action: Option<String>,
}

/// WebSocket upgrade handler. Each connection is one window client.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let url = params.url.unwrap_or_else(|| "/".to_string());
    ws.on_upgrade(move |socket| handle_socket(socket, state, url))
}

async fn handle_socket(socket: WebSocket, state: SharedState, url: String) {
    let (mut sender, mut receiver) = socket.split();
    let (client_id, mut rx) = state.clients().register(&url);

    let welcome = json!({ "type": events::CONNECTED, "clientId": client_id });
    if sender
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        state.clients().unregister(&client_id);
        return;
    }

    // Bring the page's tray mirror up to date.
    for notification in state.tray().list() {
        let shown = json!({ "type": events::NOTIFICATION_SHOWN, "notification": notification });
        if sender
            .send(Message::Text(shown.to_string().into()))
            .await
            .is_err()
        {
            state.clients().unregister(&client_id);
            return;
        }
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_client_message(&recv_state, &cid, &text),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    let shutdown = state.shutdown_token().clone();
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
        _ = shutdown.cancelled() => {
            send_task.abort();
            recv_task.abort();
        }
    }

    state.clients().unregister(&client_id);
}

/// Route one message from a page.
pub(crate) fn handle_client_message(state: &SharedState, client_id: &str, text: &str) {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(client_id = %client_id, "Ignoring non-JSON page message: {e}");
            return;
        }
    };

    match message_type(&value) {
        Some(events::NOTIFICATION_CLICK) => {
            let click: ClickMessage = match serde_json::from_value(value) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(client_id = %client_id, "Malformed notification click: {e}");
                    return;
                }
            };
            // Failures are logged by dispatch.
            let _ = state.click_notification(&click.tag, click.action);
        }
        _ => {
            let _ = state.dispatch(WorkerEvent::Message(value));
        }
    }
}
