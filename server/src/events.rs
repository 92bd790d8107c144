//! Message type names exchanged with pages over the WebSocket.
//!
//! Worker-originated messages (`NAVIGATE`, `SYNC_EVENTS`) and the page's
//! `SCHEDULE_NOTIFICATION` are defined in `worker_core::message`; these are
//! the ones only the host speaks.

// -- Host → page --

pub const CONNECTED: &str = "CONNECTED";
pub const FOCUS: &str = "FOCUS";
pub const NOTIFICATION_SHOWN: &str = "NOTIFICATION_SHOWN";
pub const NOTIFICATION_CLOSED: &str = "NOTIFICATION_CLOSED";

// -- Page → host --

pub const NOTIFICATION_CLICK: &str = "NOTIFICATION_CLICK";
