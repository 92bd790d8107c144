//! Messages exchanged between pages and the worker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notification::NotificationData;

pub const SCHEDULE_NOTIFICATION: &str = "SCHEDULE_NOTIFICATION";
pub const NAVIGATE: &str = "NAVIGATE";
pub const SYNC_EVENTS: &str = "SYNC_EVENTS";

/// Request to show a notification after `delay` milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub delay: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
}

/// Page → worker messages the worker acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    #[serde(rename = "SCHEDULE_NOTIFICATION")]
    ScheduleNotification(ScheduleRequest),
}

impl WorkerMessage {
    /// Parse a raw page message.
    ///
    /// Returns `Ok(None)` for message types the worker does not handle and
    /// an error when a handled type carries malformed fields.
    pub fn parse(value: &Value) -> Result<Option<Self>, serde_json::Error> {
        match message_type(value) {
            Some(SCHEDULE_NOTIFICATION) => serde_json::from_value(value.clone()).map(Some),
            _ => Ok(None),
        }
    }
}

/// Worker → page messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageMessage {
    Navigate { url: String },
    SyncEvents { timestamp: i64 },
}

/// The `type` field of a raw message, if any.
pub fn message_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}
