//! The worker itself: one entry point, one event union.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::click::{self, ClickOutcome, NotificationClick};
use crate::config::WorkerConfig;
use crate::lifecycle::{self, ActivationReport};
use crate::message::{WorkerMessage, message_type};
use crate::platform::{CacheStorage, Clients, NotificationCenter, ScheduleStore};
use crate::push::{self, PushDelivery, PushEvent};
use crate::scheduler::Scheduler;
use crate::sync;
use crate::{WorkerError, WorkerResult, now_ms};

/// Every event the platform can deliver to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Install,
    Activate,
    Push(PushEvent),
    NotificationClick(NotificationClick),
    /// Background-sync opportunity carrying its registration tag.
    Sync(String),
    /// A raw message posted by a page.
    Message(Value),
}

impl WorkerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Push(_) => "push",
            Self::NotificationClick(_) => "notificationclick",
            Self::Sync(_) => "sync",
            Self::Message(_) => "message",
        }
    }
}

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

/// What handling an event produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Installed,
    Activated(ActivationReport),
    Pushed(PushDelivery),
    Clicked(ClickOutcome),
    Synced { notified: usize },
    Scheduled,
    Ignored,
}

pub struct ServiceWorker {
    config: Arc<WorkerConfig>,
    notifications: Arc<dyn NotificationCenter>,
    clients: Arc<dyn Clients>,
    caches: Arc<dyn CacheStorage>,
    scheduler: Scheduler,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
}

pub struct ServiceWorkerBuilder {
    config: WorkerConfig,
    notifications: Arc<dyn NotificationCenter>,
    clients: Arc<dyn Clients>,
    caches: Arc<dyn CacheStorage>,
    schedule_store: Option<Arc<dyn ScheduleStore>>,
}

impl ServiceWorkerBuilder {
    pub fn with_schedule_store(mut self, store: Arc<dyn ScheduleStore>) -> Self {
        self.schedule_store = Some(store);
        self
    }

    pub fn build(self) -> ServiceWorker {
        let config = Arc::new(self.config);
        let scheduler = Scheduler::new(
            config.clone(),
            self.notifications.clone(),
            self.schedule_store,
        );
        ServiceWorker {
            config,
            notifications: self.notifications,
            clients: self.clients,
            caches: self.caches,
            scheduler,
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }
}

impl ServiceWorker {
    pub fn builder(
        config: WorkerConfig,
        notifications: Arc<dyn NotificationCenter>,
        clients: Arc<dyn Clients>,
        caches: Arc<dyn CacheStorage>,
    ) -> ServiceWorkerBuilder {
        ServiceWorkerBuilder {
            config,
            notifications,
            clients,
            caches,
            schedule_store: None,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Handle one event to completion.
    ///
    /// Must be called from within a Tokio runtime: scheduling requests spawn
    /// their timers on it.
    pub fn dispatch(&self, event: WorkerEvent) -> WorkerResult<Dispatched> {
        tracing::debug!(event = event.name(), "Dispatching worker event");
        match event {
            WorkerEvent::Install => Ok(self.on_install()),
            WorkerEvent::Activate => self.on_activate(),
            WorkerEvent::Push(push) => {
                let delivery = push::handle_push(&self.config, self.notifications.as_ref(), &push)?;
                Ok(Dispatched::Pushed(delivery))
            }
            WorkerEvent::NotificationClick(click) => {
                let outcome = click::handle_click(
                    &self.config,
                    self.notifications.as_ref(),
                    self.clients.as_ref(),
                    &click,
                )?;
                Ok(Dispatched::Clicked(outcome))
            }
            WorkerEvent::Sync(tag) => {
                let notified = sync::handle_sync(self.clients.as_ref(), &tag, now_ms());
                Ok(Dispatched::Synced { notified })
            }
            WorkerEvent::Message(value) => self.on_message(&value),
        }
    }

    /// Re-arm schedules persisted by a previous run.
    pub fn restore_schedules(&self) -> WorkerResult<usize> {
        Ok(self.scheduler.restore()?)
    }

    /// Stop every armed timer.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        tracing::info!("Worker timers cancelled");
    }

    fn on_install(&self) -> Dispatched {
        if self.state() != WorkerState::Parsed {
            tracing::debug!(state = ?self.state(), "Install already handled");
            return Dispatched::Ignored;
        }
        self.set_state(WorkerState::Installing);
        lifecycle::install(self.caches.as_ref(), &self.config.cache_name);
        self.skip_waiting.store(true, Ordering::SeqCst);
        self.set_state(WorkerState::Installed);
        tracing::info!(cache = %self.config.cache_name, "Worker installed");
        Dispatched::Installed
    }

    fn on_activate(&self) -> WorkerResult<Dispatched> {
        match self.state() {
            WorkerState::Installed => {}
            state => {
                tracing::debug!(state = ?state, "Activate ignored in current state");
                return Ok(Dispatched::Ignored);
            }
        }
        self.set_state(WorkerState::Activating);
        let result = lifecycle::activate(
            self.caches.as_ref(),
            self.clients.as_ref(),
            &self.config.cache_name,
        );
        // Activation completes even when cleanup failed.
        self.set_state(WorkerState::Activated);
        let report = result?;
        tracing::info!(
            deleted = report.deleted.len(),
            claimed = report.claimed,
            "Worker activated"
        );
        Ok(Dispatched::Activated(report))
    }

    fn on_message(&self, value: &Value) -> WorkerResult<Dispatched> {
        match WorkerMessage::parse(value) {
            Ok(Some(WorkerMessage::ScheduleNotification(request))) => {
                self.scheduler.schedule(request);
                Ok(Dispatched::Scheduled)
            }
            Ok(None) => {
                tracing::debug!(message_type = ?message_type(value), "Ignoring page message");
                Ok(Dispatched::Ignored)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed schedule request");
                Err(WorkerError::InvalidMessage(e.to_string()))
            }
        }
    }

    fn set_state(&self, next: WorkerState) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        *state = next;
    }
}
