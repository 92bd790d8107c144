//! Background notification worker for the Sacred Recitations reader.
//!
//! The worker reacts to lifecycle, push, notification-click, sync and
//! message events delivered through [`ServiceWorker::dispatch`]. Everything
//! it touches outside its own process (the notification tray, open windows,
//! cache storage, the durable schedule) sits behind the traits in
//! [`platform`], so a host decides how those are provided.
//!
//! The page side lives in [`page`]: it computes reminder delays for
//! calendar events and produces the scheduling messages the worker consumes.

pub mod click;
pub mod config;
pub mod lifecycle;
pub mod message;
pub mod notification;
pub mod page;
pub mod platform;
pub mod push;
pub mod scheduler;
pub mod sync;
pub mod worker;

#[cfg(test)]
mod testutil;

pub use config::WorkerConfig;
pub use message::{PageMessage, ScheduleRequest, WorkerMessage};
pub use notification::{Notification, NotificationAction, NotificationData, NotificationOptions};
pub use platform::{CacheStorage, Clients, NotificationCenter, PlatformError, ScheduleStore};
pub use worker::{ServiceWorker, ServiceWorkerBuilder, WorkerEvent, WorkerState};

/// Current cache namespace. Bump to purge older namespaces on next activation.
pub const CACHE_NAME: &str = "sacred-recitations-v1";

/// Deep link used when a notification carries no `url`.
pub const DEFAULT_NOTIFICATION_URL: &str = "/calendar";

/// Icon and badge shown on every notification.
pub const DEFAULT_ICON: &str = "/main.png";

/// Vibration pattern in milliseconds (vibrate, pause, vibrate).
pub const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Background-sync tag that triggers the event sync bridge.
pub const SYNC_EVENTS_TAG: &str = "sync-events";

/// Unified error type for the worker-core crate.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),
}

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Current wall-clock time in Unix milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests;
