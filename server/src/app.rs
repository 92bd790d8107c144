use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use recitation_db::Database;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use worker_core::click::{ClickOutcome, NotificationClick};
use worker_core::worker::Dispatched;
use worker_core::{ServiceWorker, WorkerEvent, WorkerResult};

use crate::config::{AppConfig, SettingsManager};
use crate::platform::{
    ClientRegistry, DbCacheStorage, DbScheduleStore, NotificationTray, WindowOpener,
};

/// Application shared state accessible from axum handlers and background tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    db: Database,
    data_dir: PathBuf,
    worker: ServiceWorker,
    tray: Arc<NotificationTray>,
    clients: Arc<ClientRegistry>,
    shutdown_token: CancellationToken,
    started_at: DateTime<Utc>,
}

impl SharedState {
    /// Build the platform around an opened database and loaded config, and
    /// the worker on top of it. The worker is not installed yet.
    pub fn new(db: Database, config: AppConfig, data_dir: PathBuf) -> Self {
        let opener = WindowOpener::new(config.worker_origin.clone(), &config.window_open_command);
        let clients = Arc::new(ClientRegistry::new(config.worker_origin.clone(), opener));
        let tray = Arc::new(NotificationTray::new(clients.clone()));
        let caches = Arc::new(DbCacheStorage::new(db.clone()));

        let mut builder =
            ServiceWorker::builder(config.worker_config(), tray.clone(), clients.clone(), caches);
        if config.persist_schedules {
            builder = builder.with_schedule_store(Arc::new(DbScheduleStore::new(db.clone())));
        }

        Self {
            inner: Arc::new(SharedStateInner {
                config: RwLock::new(config),
                db,
                data_dir,
                worker: builder.build(),
                tray,
                clients,
                shutdown_token: CancellationToken::new(),
                started_at: Utc::now(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(8080)
    }

    pub fn bind_address(&self) -> IpAddr {
        self.inner
            .config
            .try_read()
            .map(|c| c.bind_address)
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    pub fn worker(&self) -> &ServiceWorker {
        &self.inner.worker
    }

    pub fn tray(&self) -> &NotificationTray {
        &self.inner.tray
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.inner.clients
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Reload config from the database. The worker keeps the configuration
    /// it was built with until the next restart.
    pub async fn reload_config(&self) -> Result<(), anyhow::Error> {
        let sm = SettingsManager::new(self.inner.db.clone());
        let mut config = self.inner.config.write().await;
        config.reload(&sm)?;
        Ok(())
    }

    /// Deliver an event to the worker, logging failures.
    pub fn dispatch(&self, event: WorkerEvent) -> WorkerResult<Dispatched> {
        let name = event.name();
        let result = self.inner.worker.dispatch(event);
        if let Err(e) = &result {
            tracing::error!(event = name, "Worker event failed: {e}");
        }
        result
    }

    /// Click the displayed notification with `tag`. `Ok(None)` when no such
    /// notification is in the tray.
    pub fn click_notification(
        &self,
        tag: &str,
        action: Option<String>,
    ) -> WorkerResult<Option<ClickOutcome>> {
        let Some(notification) = self.inner.tray.get(tag) else {
            tracing::warn!(tag = %tag, "Click for unknown notification");
            return Ok(None);
        };
        let click = NotificationClick {
            notification,
            action,
        };
        match self.dispatch(WorkerEvent::NotificationClick(click))? {
            Dispatched::Clicked(outcome) => Ok(Some(outcome)),
            other => {
                tracing::warn!("Unexpected click dispatch result: {other:?}");
                Ok(None)
            }
        }
    }
}
