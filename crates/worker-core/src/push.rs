//! Push delivery: turns an inbound push message into a displayed notification.

use serde_json::{Map, Value};

use crate::config::WorkerConfig;
use crate::notification::{
    Notification, NotificationAction, NotificationData, NotificationOptions,
};
use crate::platform::{NotificationCenter, PlatformResult};
use crate::VIBRATE_PATTERN;

pub const DEFAULT_TITLE: &str = "Upcoming Event";
pub const DEFAULT_BODY: &str = "You have an upcoming event";
pub const DEFAULT_TAG: &str = "event-reminder";

/// A push message as delivered by the push service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEvent {
    pub data: Option<Vec<u8>>,
}

impl PushEvent {
    pub fn empty() -> Self {
        Self { data: None }
    }

    pub fn with_body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(body.into()),
        }
    }
}

/// Optional JSON body of a push message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<NotificationData>,
    pub tag: Option<String>,
}

impl PushPayload {
    /// Parse a push body. Only a body that is not a JSON object is an error;
    /// a field of the wrong type is ignored and falls back on its own.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(format!("expected a JSON object, got {}", kind(&other))),
        };
        Ok(Self {
            title: text_field(&fields, "title"),
            body: text_field(&fields, "body"),
            data: fields.get("data").and_then(Value::as_object).cloned(),
            tag: text_field(&fields, "tag"),
        })
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?;
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            if !value.is_null() {
                tracing::warn!(field = key, "Ignoring non-string push payload field");
            }
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// How the push body was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadStatus {
    Absent,
    Applied,
    /// The body was not a JSON object; defaults were used.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushDelivery {
    pub notification: Notification,
    pub payload: PayloadStatus,
}

/// Resolve the notification for a push event. Payload fields override the
/// defaults one by one; a body that is not a JSON object is dropped entirely.
pub fn notification_for_push(config: &WorkerConfig, event: &PushEvent) -> PushDelivery {
    let (payload, status) = match event.data.as_deref() {
        None => (PushPayload::default(), PayloadStatus::Absent),
        Some(bytes) => match PushPayload::parse(bytes) {
            Ok(payload) => (payload, PayloadStatus::Applied),
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse push payload, using defaults");
                (PushPayload::default(), PayloadStatus::Malformed(e))
            }
        },
    };

    let notification = Notification {
        title: non_empty(payload.title).unwrap_or_else(|| DEFAULT_TITLE.into()),
        options: NotificationOptions {
            body: non_empty(payload.body).unwrap_or_else(|| DEFAULT_BODY.into()),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            tag: non_empty(payload.tag).unwrap_or_else(|| DEFAULT_TAG.into()),
            data: payload.data.unwrap_or_default(),
            require_interaction: false,
            vibrate: VIBRATE_PATTERN.to_vec(),
            actions: vec![NotificationAction::view(), NotificationAction::dismiss()],
        },
    };

    PushDelivery {
        notification,
        payload: status,
    }
}

/// Handle a push event: resolve the notification and display it.
pub fn handle_push(
    config: &WorkerConfig,
    notifications: &dyn NotificationCenter,
    event: &PushEvent,
) -> PlatformResult<PushDelivery> {
    let delivery = notification_for_push(config, event);
    notifications.show(delivery.notification.clone())?;
    tracing::info!(tag = %delivery.notification.tag(), "Push notification displayed");
    Ok(delivery)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
