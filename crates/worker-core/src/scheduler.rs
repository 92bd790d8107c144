//! Delayed notifications requested by pages.
//!
//! Each request arms its own Tokio timer. Without a [`ScheduleStore`] a
//! timer lives only as long as the worker process. With one, the request is
//! persisted with its absolute wake time before the timer is armed, removed
//! after it fires, and [`Scheduler::restore`] re-arms whatever is left after
//! a restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::message::ScheduleRequest;
use crate::notification::{Notification, NotificationAction, NotificationOptions};
use crate::platform::{NotificationCenter, PendingNotification, PlatformResult, ScheduleStore};
use crate::{VIBRATE_PATTERN, now_ms};

#[derive(Clone)]
pub struct Scheduler {
    config: Arc<WorkerConfig>,
    notifications: Arc<dyn NotificationCenter>,
    store: Option<Arc<dyn ScheduleStore>>,
    shutdown: CancellationToken,
    armed: Arc<AtomicUsize>,
}

impl Scheduler {
    pub fn new(
        config: Arc<WorkerConfig>,
        notifications: Arc<dyn NotificationCenter>,
        store: Option<Arc<dyn ScheduleStore>>,
    ) -> Self {
        Self {
            config,
            notifications,
            store,
            shutdown: CancellationToken::new(),
            armed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_some()
    }

    /// Number of timers currently waiting to fire.
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }

    /// Arm a timer for `request`. Must be called from within a Tokio runtime.
    pub fn schedule(&self, request: ScheduleRequest) -> JoinHandle<()> {
        let pending = PendingNotification {
            title: request.title,
            body: request.body,
            data: request.data.unwrap_or_default(),
            fire_at_ms: now_ms().saturating_add(i64::try_from(request.delay).unwrap_or(i64::MAX)),
        };

        let id = self.store.as_ref().and_then(|store| match store.persist(&pending) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist schedule, keeping it in memory only");
                None
            }
        });

        tracing::info!(
            title = %pending.title,
            delay_ms = request.delay,
            durable = id.is_some(),
            "Notification scheduled"
        );
        self.arm(pending, id, Duration::from_millis(request.delay))
    }

    /// Re-arm every persisted schedule. Entries whose wake time has passed
    /// fire immediately. Returns how many timers were armed.
    pub fn restore(&self) -> PlatformResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let now = now_ms();
        let entries = store.pending()?;
        for entry in &entries {
            let wait = u64::try_from(entry.pending.fire_at_ms.saturating_sub(now)).unwrap_or(0);
            if wait == 0 {
                tracing::info!(id = entry.id, title = %entry.pending.title, "Firing overdue schedule");
            }
            self.arm(entry.pending.clone(), Some(entry.id), Duration::from_millis(wait));
        }
        if !entries.is_empty() {
            tracing::info!(count = entries.len(), "Restored persisted schedules");
        }
        Ok(entries.len())
    }

    /// Cancel every armed timer. Persisted entries stay for the next start.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn arm(&self, pending: PendingNotification, id: Option<i64>, delay: Duration) -> JoinHandle<()> {
        let scheduler = self.clone();
        scheduler.armed.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let cancelled = tokio::select! {
                _ = scheduler.shutdown.cancelled() => true,
                _ = sleep(delay) => false,
            };
            if !cancelled {
                scheduler.fire(&pending, id);
            }
            scheduler.armed.fetch_sub(1, Ordering::SeqCst);
        })
    }

    fn fire(&self, pending: &PendingNotification, id: Option<i64>) {
        let notification = scheduled_notification(&self.config, pending, now_ms());
        let tag = notification.tag().to_string();
        match self.notifications.show(notification) {
            Ok(()) => tracing::info!(tag = %tag, "Scheduled notification displayed"),
            Err(e) => tracing::error!(tag = %tag, error = %e, "Failed to display scheduled notification"),
        }

        if let (Some(store), Some(id)) = (&self.store, id) {
            if let Err(e) = store.remove(id) {
                tracing::warn!(id, error = %e, "Failed to remove fired schedule");
            }
        }
    }
}

/// Build the notification shown when a schedule fires at `now_ms`.
pub fn scheduled_notification(
    config: &WorkerConfig,
    pending: &PendingNotification,
    now_ms: i64,
) -> Notification {
    let tag = match pending.data.get("eventId").and_then(event_id_text) {
        Some(event_id) => format!("event-{event_id}"),
        None => format!("event-{now_ms}"),
    };

    let mut actions = vec![NotificationAction::view()];
    if config.scheduled_dismiss_action {
        actions.push(NotificationAction::dismiss());
    }

    Notification {
        title: pending.title.clone(),
        options: NotificationOptions {
            body: pending.body.clone(),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            tag,
            data: pending.data.clone(),
            require_interaction: false,
            vibrate: VIBRATE_PATTERN.to_vec(),
            actions,
        },
    }
}

/// Text form of a supplied event id. Empty strings, `0`, `false` and
/// `null` count as "no id". Integral numbers print without a fraction
/// (`1.0` gives `1`). Objects and arrays have no usable text form and also
/// fall back to the timestamp tag.
fn event_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i != 0).then(|| i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f == 0.0 {
                    None
                } else if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}
