//! Open pages, one per WebSocket connection.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;
use url::Url;
use worker_core::platform::{ClientInfo, ClientQuery, ClientType, PlatformResult};
use worker_core::{Clients, PageMessage, PlatformError};

use super::window::WindowOpener;
use crate::events;

struct Connection {
    info: ClientInfo,
    tx: mpsc::UnboundedSender<String>,
}

/// Registry of connected pages, in connection order.
pub struct ClientRegistry {
    origin: Url,
    opener: WindowOpener,
    connections: RwLock<Vec<Connection>>,
    /// Set once the worker has claimed its clients; later pages start controlled.
    claimed: AtomicBool,
}

impl ClientRegistry {
    pub fn new(origin: Url, opener: WindowOpener) -> Self {
        Self {
            origin,
            opener,
            connections: RwLock::new(Vec::new()),
            claimed: AtomicBool::new(false),
        }
    }

    /// Add a page at `url`. Returns its id and the stream of outbound messages.
    pub fn register(&self, url: &str) -> (String, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = uuid::Uuid::new_v4().to_string();
        let url = self
            .origin
            .join(url)
            .map(String::from)
            .unwrap_or_else(|_| self.origin.to_string());
        let info = ClientInfo {
            id: id.clone(),
            url,
            client_type: ClientType::Window,
            controlled: self.claimed.load(Ordering::SeqCst),
            focused: false,
        };
        tracing::info!(client_id = %id, url = %info.url, controlled = info.controlled, "Page connected");
        self.write().push(Connection { info, tx });
        (id, rx)
    }

    pub fn unregister(&self, id: &str) {
        self.write().retain(|c| c.info.id != id);
        tracing::info!(client_id = %id, "Page disconnected");
    }

    /// Snapshot of every connected page.
    pub fn list(&self) -> Vec<ClientInfo> {
        self.read().iter().map(|c| c.info.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send `message` to every page, dropping pages whose socket is gone.
    pub fn broadcast<T: Serialize>(&self, message: &T) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize broadcast: {e}");
                return;
            }
        };
        self.write().retain(|c| c.tx.send(text.clone()).is_ok());
    }

    fn send_to<T: Serialize>(&self, client_id: &str, message: &T) -> PlatformResult<()> {
        let text = serde_json::to_string(message)
            .map_err(|e| PlatformError::Storage(format!("serialize message: {e}")))?;
        let connections = self.read();
        let conn = connections
            .iter()
            .find(|c| c.info.id == client_id)
            .ok_or_else(|| PlatformError::ClientNotFound(client_id.into()))?;
        conn.tx
            .send(text)
            .map_err(|_| PlatformError::ClientGone(client_id.into()))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Connection>> {
        self.connections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Connection>> {
        self.connections.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clients for ClientRegistry {
    fn match_all(&self, query: ClientQuery) -> PlatformResult<Vec<ClientInfo>> {
        Ok(self
            .read()
            .iter()
            .map(|c| &c.info)
            .filter(|info| {
                query.client_type == ClientType::All || info.client_type == query.client_type
            })
            .filter(|info| query.include_uncontrolled || info.controlled)
            .cloned()
            .collect())
    }

    fn post_message(&self, client_id: &str, message: &PageMessage) -> PlatformResult<()> {
        self.send_to(client_id, message)
    }

    fn focus(&self, client_id: &str) -> PlatformResult<()> {
        {
            let mut connections = self.write();
            if !connections.iter().any(|c| c.info.id == client_id) {
                return Err(PlatformError::ClientNotFound(client_id.into()));
            }
            for conn in connections.iter_mut() {
                conn.info.focused = conn.info.id == client_id;
            }
        }
        self.send_to(client_id, &serde_json::json!({ "type": events::FOCUS }))
    }

    fn open_window(&self, url: &str) -> PlatformResult<()> {
        self.opener.open(url)
    }

    fn claim(&self) -> PlatformResult<usize> {
        self.claimed.store(true, Ordering::SeqCst);
        let mut claimed = 0;
        for conn in self.write().iter_mut().filter(|c| !c.info.controlled) {
            conn.info.controlled = true;
            claimed += 1;
        }
        Ok(claimed)
    }
}
