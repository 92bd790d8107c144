//! Platform collaborators the worker runs against.
//!
//! A browser provides these natively; the host binary implements them over
//! WebSocket connections, an in-memory tray and SQLite.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::PageMessage;
use crate::notification::Notification;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("notification permission denied")]
    PermissionDenied,

    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("client disconnected: {0}")]
    ClientGone(String),

    #[error("cannot open window: {0}")]
    WindowOpen(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// The notification tray.
pub trait NotificationCenter: Send + Sync {
    /// Display a notification, replacing any notification with the same tag.
    fn show(&self, notification: Notification) -> PlatformResult<()>;

    /// Remove the notification with this tag. Closing an unknown tag is not an error.
    fn close(&self, tag: &str) -> PlatformResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    Window,
    Worker,
    All,
}

/// Filter for [`Clients::match_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientQuery {
    pub client_type: ClientType,
    /// Also return clients this worker does not control yet.
    pub include_uncontrolled: bool,
}

impl ClientQuery {
    pub fn windows() -> Self {
        Self::default()
    }

    pub fn all_windows() -> Self {
        Self {
            client_type: ClientType::Window,
            include_uncontrolled: true,
        }
    }
}

/// An open page as seen by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: String,
    pub url: String,
    pub client_type: ClientType,
    pub controlled: bool,
    pub focused: bool,
}

/// Open pages of the worker's origin.
pub trait Clients: Send + Sync {
    /// Clients matching `query`, in platform order.
    fn match_all(&self, query: ClientQuery) -> PlatformResult<Vec<ClientInfo>>;

    fn post_message(&self, client_id: &str, message: &PageMessage) -> PlatformResult<()>;

    fn focus(&self, client_id: &str) -> PlatformResult<()>;

    /// Open a new window at `url` (relative URLs resolve against the origin).
    fn open_window(&self, url: &str) -> PlatformResult<()>;

    /// Take control of every open page. Returns how many became controlled.
    fn claim(&self) -> PlatformResult<usize>;
}

/// Named cache namespaces.
pub trait CacheStorage: Send + Sync {
    /// Create the namespace if missing.
    fn open(&self, name: &str) -> PlatformResult<()>;

    fn keys(&self) -> PlatformResult<Vec<String>>;

    /// Returns `true` if a namespace was deleted.
    fn delete(&self, name: &str) -> PlatformResult<bool>;
}

/// A delayed notification with its absolute wake time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub fire_at_ms: i64,
}

/// A [`PendingNotification`] as persisted by a [`ScheduleStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub id: i64,
    #[serde(flatten)]
    pub pending: PendingNotification,
}

/// Durable record of armed timers, used to re-arm them after a restart.
pub trait ScheduleStore: Send + Sync {
    fn persist(&self, pending: &PendingNotification) -> PlatformResult<i64>;

    fn remove(&self, id: i64) -> PlatformResult<()>;

    /// Every persisted entry, soonest first.
    fn pending(&self) -> PlatformResult<Vec<StoredSchedule>>;
}
