//! Notification type definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque payload attached to a notification. `url` is the only key the
/// worker itself reads.
pub type NotificationData = Map<String, Value>;

/// A button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

impl NotificationAction {
    pub const VIEW: &'static str = "view";
    pub const DISMISS: &'static str = "dismiss";

    pub fn view() -> Self {
        Self {
            action: Self::VIEW.into(),
            title: "View".into(),
        }
    }

    pub fn dismiss() -> Self {
        Self {
            action: Self::DISMISS.into(),
            title: "Dismiss".into(),
        }
    }
}

/// Display parameters handed to the notification tray.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Replacement key: showing a notification with the tag of one already
    /// in the tray replaces it.
    pub tag: String,
    #[serde(default)]
    pub data: NotificationData,
    #[serde(default)]
    pub require_interaction: bool,
    #[serde(default)]
    pub vibrate: Vec<u32>,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
}

/// A notification as displayed (or about to be displayed) in the tray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    #[serde(flatten)]
    pub options: NotificationOptions,
}

impl Notification {
    pub fn tag(&self) -> &str {
        &self.options.tag
    }

    /// The `data.url` deep link, if it is a non-empty string.
    pub fn url(&self) -> Option<&str> {
        self.options
            .data
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.options.actions.iter().any(|a| a.action == action)
    }
}
