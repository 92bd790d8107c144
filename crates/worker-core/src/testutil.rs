//! In-memory platform fakes for tests.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::WorkerConfig;
use crate::message::PageMessage;
use crate::notification::Notification;
use crate::platform::{
    CacheStorage, ClientInfo, ClientQuery, ClientType, Clients, NotificationCenter,
    PendingNotification, PlatformError, PlatformResult, ScheduleStore, StoredSchedule,
};
use crate::worker::ServiceWorker;

pub const TEST_ORIGIN: &str = "https://recitations.example";

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Tray that replaces by tag and records every call.
#[derive(Default)]
pub struct FakeTray {
    displayed: Mutex<Vec<Notification>>,
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<String>>,
    deny: AtomicBool,
}

impl FakeTray {
    /// Simulate revoked permission: every `show` fails.
    pub fn deny_permission(&self) {
        self.deny.store(true, Ordering::SeqCst);
    }

    /// Notifications currently in the tray.
    pub fn displayed(&self) -> Vec<Notification> {
        lock(&self.displayed).clone()
    }

    /// Every notification ever shown, in order.
    pub fn shown(&self) -> Vec<Notification> {
        lock(&self.shown).clone()
    }

    pub fn closed(&self) -> Vec<String> {
        lock(&self.closed).clone()
    }
}

impl NotificationCenter for FakeTray {
    fn show(&self, notification: Notification) -> PlatformResult<()> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(PlatformError::PermissionDenied);
        }
        let mut displayed = lock(&self.displayed);
        displayed.retain(|n| n.tag() != notification.tag());
        displayed.push(notification.clone());
        lock(&self.shown).push(notification);
        Ok(())
    }

    fn close(&self, tag: &str) -> PlatformResult<()> {
        lock(&self.displayed).retain(|n| n.tag() != tag);
        lock(&self.closed).push(tag.to_string());
        Ok(())
    }
}

/// Window registry recording posted messages, focus and opened windows.
#[derive(Default)]
pub struct FakeClients {
    clients: Mutex<Vec<ClientInfo>>,
    posted: Mutex<Vec<(String, PageMessage)>>,
    focused: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
    fail_enumeration: AtomicBool,
}

impl FakeClients {
    pub fn add_window(&self, id: &str, url: &str, controlled: bool) {
        lock(&self.clients).push(ClientInfo {
            id: id.into(),
            url: url.into(),
            client_type: ClientType::Window,
            controlled,
            focused: false,
        });
    }

    pub fn fail_enumeration(&self) {
        self.fail_enumeration.store(true, Ordering::SeqCst);
    }

    pub fn posted(&self) -> Vec<(String, PageMessage)> {
        lock(&self.posted).clone()
    }

    pub fn focused(&self) -> Vec<String> {
        lock(&self.focused).clone()
    }

    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }

    pub fn controlled_ids(&self) -> Vec<String> {
        lock(&self.clients)
            .iter()
            .filter(|c| c.controlled)
            .map(|c| c.id.clone())
            .collect()
    }
}

impl Clients for FakeClients {
    fn match_all(&self, query: ClientQuery) -> PlatformResult<Vec<ClientInfo>> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(PlatformError::Storage("enumeration failed".into()));
        }
        Ok(lock(&self.clients)
            .iter()
            .filter(|c| query.client_type == ClientType::All || c.client_type == query.client_type)
            .filter(|c| query.include_uncontrolled || c.controlled)
            .cloned()
            .collect())
    }

    fn post_message(&self, client_id: &str, message: &PageMessage) -> PlatformResult<()> {
        if !lock(&self.clients).iter().any(|c| c.id == client_id) {
            return Err(PlatformError::ClientNotFound(client_id.into()));
        }
        lock(&self.posted).push((client_id.into(), message.clone()));
        Ok(())
    }

    fn focus(&self, client_id: &str) -> PlatformResult<()> {
        let mut clients = lock(&self.clients);
        let client = clients
            .iter_mut()
            .find(|c| c.id == client_id)
            .ok_or_else(|| PlatformError::ClientNotFound(client_id.into()))?;
        client.focused = true;
        lock(&self.focused).push(client_id.into());
        Ok(())
    }

    fn open_window(&self, url: &str) -> PlatformResult<()> {
        lock(&self.opened).push(url.into());
        Ok(())
    }

    fn claim(&self) -> PlatformResult<usize> {
        let mut clients = lock(&self.clients);
        let mut claimed = 0;
        for client in clients.iter_mut().filter(|c| !c.controlled) {
            client.controlled = true;
            claimed += 1;
        }
        Ok(claimed)
    }
}

/// Cache namespaces kept in insertion order.
#[derive(Default)]
pub struct FakeCaches {
    names: Mutex<Vec<String>>,
    fail_keys: AtomicBool,
}

impl FakeCaches {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            names: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            fail_keys: AtomicBool::new(false),
        }
    }

    pub fn fail_keys(&self) {
        self.fail_keys.store(true, Ordering::SeqCst);
    }

    pub fn names(&self) -> Vec<String> {
        lock(&self.names).clone()
    }
}

impl CacheStorage for FakeCaches {
    fn open(&self, name: &str) -> PlatformResult<()> {
        let mut names = lock(&self.names);
        if !names.iter().any(|n| n == name) {
            names.push(name.into());
        }
        Ok(())
    }

    fn keys(&self) -> PlatformResult<Vec<String>> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(PlatformError::Storage("keys failed".into()));
        }
        Ok(self.names())
    }

    fn delete(&self, name: &str) -> PlatformResult<bool> {
        let mut names = lock(&self.names);
        let before = names.len();
        names.retain(|n| n != name);
        Ok(names.len() != before)
    }
}

/// Schedule store backed by a vector.
#[derive(Default)]
pub struct FakeScheduleStore {
    entries: Mutex<Vec<StoredSchedule>>,
    next_id: AtomicI64,
}

impl FakeScheduleStore {
    pub fn entries(&self) -> Vec<StoredSchedule> {
        lock(&self.entries).clone()
    }
}

impl ScheduleStore for FakeScheduleStore {
    fn persist(&self, pending: &PendingNotification) -> PlatformResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.entries).push(StoredSchedule {
            id,
            pending: pending.clone(),
        });
        Ok(id)
    }

    fn remove(&self, id: i64) -> PlatformResult<()> {
        lock(&self.entries).retain(|e| e.id != id);
        Ok(())
    }

    fn pending(&self) -> PlatformResult<Vec<StoredSchedule>> {
        let mut entries = self.entries();
        entries.sort_by_key(|e| e.pending.fire_at_ms);
        Ok(entries)
    }
}

/// A worker wired to fresh fakes.
pub struct Harness {
    pub worker: ServiceWorker,
    pub tray: Arc<FakeTray>,
    pub clients: Arc<FakeClients>,
    pub caches: Arc<FakeCaches>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(FakeCaches::default(), None)
    }

    pub fn with_caches(caches: FakeCaches) -> Self {
        Self::build(caches, None)
    }

    pub fn durable(store: Arc<FakeScheduleStore>) -> Self {
        Self::build(FakeCaches::default(), Some(store))
    }

    fn build(caches: FakeCaches, store: Option<Arc<FakeScheduleStore>>) -> Self {
        let tray = Arc::new(FakeTray::default());
        let clients = Arc::new(FakeClients::default());
        let caches = Arc::new(caches);
        let config = WorkerConfig::new(TEST_ORIGIN).expect("test origin parses");
        let mut builder =
            ServiceWorker::builder(config, tray.clone(), clients.clone(), caches.clone());
        if let Some(store) = store {
            builder = builder.with_schedule_store(store);
        }
        Self {
            worker: builder.build(),
            tray,
            clients,
            caches,
        }
    }
}
