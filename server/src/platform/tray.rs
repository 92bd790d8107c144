//! In-memory notification tray mirrored to connected pages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::json;
use worker_core::platform::PlatformResult;
use worker_core::{Notification, NotificationCenter};

use super::clients::ClientRegistry;
use crate::events;

/// Displayed notifications keyed by tag.
pub struct NotificationTray {
    entries: RwLock<HashMap<String, TrayEntry>>,
    next_seq: AtomicU64,
    clients: Arc<ClientRegistry>,
}

struct TrayEntry {
    notification: Notification,
    seq: u64,
}

impl NotificationTray {
    pub fn new(clients: Arc<ClientRegistry>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            clients,
        }
    }

    /// Notifications currently displayed, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut sorted: Vec<&TrayEntry> = entries.values().collect();
        sorted.sort_by_key(|e| e.seq);
        sorted.into_iter().map(|e| e.notification.clone()).collect()
    }

    pub fn get(&self, tag: &str) -> Option<Notification> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(tag).map(|e| e.notification.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationCenter for NotificationTray {
    fn show(&self, notification: Notification) -> PlatformResult<()> {
        let message = json!({
            "type": events::NOTIFICATION_SHOWN,
            "notification": &notification,
        });
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            let replaced = entries
                .insert(
                    notification.tag().to_string(),
                    TrayEntry {
                        notification,
                        seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                    },
                )
                .is_some();
            if replaced {
                tracing::debug!("Replaced notification with the same tag");
            }
        }
        self.clients.broadcast(&message);
        Ok(())
    }

    fn close(&self, tag: &str) -> PlatformResult<()> {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(tag)
            .is_some();
        if removed {
            self.clients.broadcast(&json!({
                "type": events::NOTIFICATION_CLOSED,
                "tag": tag,
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use url::Url;
    use worker_core::NotificationOptions;

    use super::*;
    use crate::platform::WindowOpener;

    fn tray() -> (NotificationTray, Arc<ClientRegistry>) {
        let origin = Url::parse("https://recitations.example").unwrap();
        let clients = Arc::new(ClientRegistry::new(origin.clone(), WindowOpener::new(origin, "")));
        (NotificationTray::new(clients.clone()), clients)
    }

    fn notification(tag: &str, title: &str) -> Notification {
        Notification {
            title: title.into(),
            options: NotificationOptions {
                tag: tag.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn show_replaces_by_tag() {
        let (tray, _) = tray();
        tray.show(notification("event-1", "first")).unwrap();
        tray.show(notification("event-2", "other")).unwrap();
        tray.show(notification("event-1", "second")).unwrap();

        assert_eq!(tray.len(), 2);
        assert_eq!(tray.get("event-1").unwrap().title, "second");
        let titles: Vec<String> = tray.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["other", "second"]);
    }

    #[test]
    fn close_removes_and_ignores_unknown_tags() {
        let (tray, _) = tray();
        tray.show(notification("event-1", "first")).unwrap();
        tray.close("event-1").unwrap();
        tray.close("never-shown").unwrap();
        assert!(tray.is_empty());
    }

    #[tokio::test]
    async fn changes_are_mirrored_to_pages() {
        let (tray, clients) = tray();
        let (_, mut rx) = clients.register("https://recitations.example/");

        tray.show(notification("event-1", "Majlis")).unwrap();
        tray.close("event-1").unwrap();

        let shown: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(shown["type"], "NOTIFICATION_SHOWN");
        assert_eq!(shown["notification"]["title"], "Majlis");
        assert_eq!(shown["notification"]["tag"], "event-1");

        let closed: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(closed, json!({ "type": "NOTIFICATION_CLOSED", "tag": "event-1" }));
    }
}
