//! Durable schedule store backed by the `scheduled_notifications` table.

use recitation_db::Database;
use recitation_db::schedules::ScheduledRow;
use worker_core::ScheduleStore;
use worker_core::platform::{PendingNotification, PlatformResult, StoredSchedule};

use super::storage_error;

pub struct DbScheduleStore {
    db: Database,
}

impl DbScheduleStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ScheduleStore for DbScheduleStore {
    fn persist(&self, pending: &PendingNotification) -> PlatformResult<i64> {
        self.db
            .insert_scheduled_notification(
                &pending.title,
                &pending.body,
                &pending.data,
                pending.fire_at_ms,
            )
            .map_err(storage_error)
    }

    fn remove(&self, id: i64) -> PlatformResult<()> {
        if !self.db.delete_scheduled_notification(id).map_err(storage_error)? {
            tracing::debug!(id, "Scheduled notification already removed");
        }
        Ok(())
    }

    fn pending(&self) -> PlatformResult<Vec<StoredSchedule>> {
        let rows = self
            .db
            .pending_scheduled_notifications()
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(stored).collect())
    }
}

fn stored(row: ScheduledRow) -> StoredSchedule {
    StoredSchedule {
        id: row.id,
        pending: PendingNotification {
            title: row.title,
            body: row.body,
            data: row.data,
            fire_at_ms: row.fire_at_ms,
        },
    }
}
