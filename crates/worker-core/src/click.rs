//! Notification click routing.

use serde::Serialize;

use crate::config::WorkerConfig;
use crate::message::PageMessage;
use crate::notification::{Notification, NotificationAction};
use crate::platform::{ClientQuery, Clients, NotificationCenter, PlatformResult};

/// A user interaction with a displayed notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationClick {
    pub notification: Notification,
    /// Action button id, `None` for a click on the notification body.
    pub action: Option<String>,
}

impl NotificationClick {
    pub fn body(notification: Notification) -> Self {
        Self {
            notification,
            action: None,
        }
    }

    pub fn action(notification: Notification, action: impl Into<String>) -> Self {
        Self {
            notification,
            action: Some(action.into()),
        }
    }

    fn is_dismiss(&self) -> bool {
        self.action.as_deref() == Some(NotificationAction::DISMISS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    Dismissed,
    /// An open window was told to navigate and focused.
    Navigated { client_id: String, url: String },
    OpenedWindow { url: String },
}

/// Close the clicked notification and route the user to its target.
///
/// The first window client on the worker's origin wins; remaining matches
/// are ignored. With no matching window a new one is opened.
pub fn handle_click(
    config: &WorkerConfig,
    notifications: &dyn NotificationCenter,
    clients: &dyn Clients,
    click: &NotificationClick,
) -> PlatformResult<ClickOutcome> {
    let tag = click.notification.tag();
    if let Err(e) = notifications.close(tag) {
        tracing::warn!(tag = %tag, error = %e, "Failed to close clicked notification");
    }

    if click.is_dismiss() {
        tracing::debug!(tag = %tag, "Notification dismissed");
        return Ok(ClickOutcome::Dismissed);
    }

    let url = click
        .notification
        .url()
        .unwrap_or(&config.default_url)
        .to_string();

    let windows = clients.match_all(ClientQuery::all_windows())?;
    if let Some(client) = windows.iter().find(|c| config.same_origin(&c.url)) {
        clients.post_message(&client.id, &PageMessage::Navigate { url: url.clone() })?;
        clients.focus(&client.id)?;
        tracing::info!(client_id = %client.id, url = %url, "Routed notification click to open window");
        return Ok(ClickOutcome::Navigated {
            client_id: client.id.clone(),
            url,
        });
    }

    clients.open_window(&url)?;
    tracing::info!(url = %url, "Opened new window for notification click");
    Ok(ClickOutcome::OpenedWindow { url })
}
