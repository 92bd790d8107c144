//! Page-side controller: permission state, reminder delays for calendar
//! events, and the messages exchanged with the worker.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::message::{PageMessage, ScheduleRequest, WorkerMessage};
use crate::DEFAULT_NOTIFICATION_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    Once,
    Daily,
    Weekly,
    Yearly,
}

/// A calendar entry such as a majlis, an Urs or a yearly commemoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// First occurrence.
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Lead time of the reminder before the event starts.
    #[serde(default)]
    pub remind_before_minutes: u32,
    #[serde(default)]
    pub url: Option<String>,
}

impl CalendarEvent {
    /// First occurrence at or after `now`.
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.starts_at >= now {
            return Some(self.starts_at);
        }
        match self.recurrence {
            Recurrence::Once => None,
            Recurrence::Daily => Some(step_forward(self.starts_at, Duration::days(1), now)),
            Recurrence::Weekly => Some(step_forward(self.starts_at, Duration::weeks(1), now)),
            Recurrence::Yearly => next_yearly(self.starts_at, now),
        }
    }

    /// Time to wait before showing the reminder, clamped at zero. `None`
    /// when the event has no future occurrence.
    pub fn reminder_delay(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        let occurrence = self.next_occurrence(now)?;
        let remind_at = occurrence - Duration::minutes(i64::from(self.remind_before_minutes));
        Some((remind_at - now).to_std().unwrap_or_default())
    }

    fn reminder_body(&self) -> String {
        if !self.description.is_empty() {
            return self.description.clone();
        }
        match self.remind_before_minutes {
            0 => format!("{} is starting now", self.title),
            m => format!("{} starts in {m} minutes", self.title),
        }
    }
}

fn step_forward(start: DateTime<Utc>, period: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    let elapsed = (now - start).num_milliseconds();
    let period_ms = period.num_milliseconds();
    let steps = (elapsed + period_ms - 1) / period_ms;
    start + Duration::milliseconds(steps * period_ms)
}

fn next_yearly(start: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut years = u32::try_from((now.year() - start.year() - 1).max(0)).ok()?;
    loop {
        let candidate = start.checked_add_months(Months::new(years.checked_mul(12)?))?;
        if candidate >= now {
            return Some(candidate);
        }
        years += 1;
    }
}

/// What a page should do in response to a worker message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Navigate(String),
    /// Recompute and repost every schedule.
    ResyncSchedules { timestamp: i64 },
}

#[derive(Debug, Clone, Default)]
pub struct PageController {
    permission: NotificationPermission,
}

impl PageController {
    pub fn new(permission: NotificationPermission) -> Self {
        Self { permission }
    }

    pub fn permission(&self) -> NotificationPermission {
        self.permission
    }

    /// Ask for permission when it has not been decided yet. A decided
    /// permission is returned unchanged without prompting.
    pub fn request_permission(
        &mut self,
        prompt: impl FnOnce() -> NotificationPermission,
    ) -> NotificationPermission {
        if self.permission == NotificationPermission::Default {
            self.permission = prompt();
            tracing::info!(permission = ?self.permission, "Notification permission decided");
        }
        self.permission
    }

    /// Schedule request for one event, if permission is granted and the
    /// event still has an occurrence ahead.
    pub fn schedule_request(
        &self,
        event: &CalendarEvent,
        now: DateTime<Utc>,
    ) -> Option<ScheduleRequest> {
        if self.permission != NotificationPermission::Granted {
            return None;
        }
        let delay = event.reminder_delay(now)?;
        let mut data = Map::new();
        data.insert("eventId".into(), json!(event.id));
        data.insert(
            "url".into(),
            json!(event.url.as_deref().unwrap_or(DEFAULT_NOTIFICATION_URL)),
        );
        Some(ScheduleRequest {
            title: event.title.clone(),
            body: event.reminder_body(),
            delay: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            data: Some(data),
        })
    }

    pub fn schedule_requests(
        &self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
    ) -> Vec<ScheduleRequest> {
        if self.permission != NotificationPermission::Granted {
            tracing::debug!(permission = ?self.permission, "Skipping schedules without permission");
            return Vec::new();
        }
        events
            .iter()
            .filter_map(|event| self.schedule_request(event, now))
            .collect()
    }

    /// The raw messages to post to the worker for `events`.
    pub fn schedule_messages(
        &self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
    ) -> Result<Vec<Value>, serde_json::Error> {
        self.schedule_requests(events, now)
            .into_iter()
            .map(|req| serde_json::to_value(WorkerMessage::ScheduleNotification(req)))
            .collect()
    }

    pub fn handle_worker_message(&self, value: &Value) -> Option<PageAction> {
        match serde_json::from_value::<PageMessage>(value.clone()) {
            Ok(PageMessage::Navigate { url }) => Some(PageAction::Navigate(url)),
            Ok(PageMessage::SyncEvents { timestamp }) => {
                Some(PageAction::ResyncSchedules { timestamp })
            }
            Err(_) => None,
        }
    }
}
