//! Durable schedule of pending delayed notifications.
//!
//! A row is written before the worker arms its timer and removed once the
//! notification has fired, so entries left behind after a restart are the
//! ones that still need re-arming.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Database, DbError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub data: Map<String, Value>,
    /// Wake time in Unix milliseconds.
    pub fire_at_ms: i64,
    pub created_at: String,
}

impl Database {
    /// Persist a pending notification and return its row id.
    pub fn insert_scheduled_notification(
        &self,
        title: &str,
        body: &str,
        data: &Map<String, Value>,
        fire_at_ms: i64,
    ) -> Result<i64, DbError> {
        let data_json = serde_json::to_string(data)
            .map_err(|e| DbError::InvalidData(format!("schedule data: {e}")))?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO scheduled_notifications (title, body, data_json, fire_at_ms, created_at)
                 VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)",
                rusqlite::params![title, body, data_json, fire_at_ms],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_scheduled_notification(&self, id: i64) -> Result<Option<ScheduledRow>, DbError> {
        let raw = self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, body, data_json, fire_at_ms, created_at
                     FROM scheduled_notifications WHERE id = ?1",
                    [id],
                    read_raw_row,
                )
                .optional()?;
            Ok(row)
        })?;
        raw.map(RawRow::decode).transpose()
    }

    /// All pending notifications, soonest first.
    pub fn pending_scheduled_notifications(&self) -> Result<Vec<ScheduledRow>, DbError> {
        let raws = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, body, data_json, fire_at_ms, created_at
                 FROM scheduled_notifications ORDER BY fire_at_ms, id",
            )?;
            let rows = stmt.query_map([], read_raw_row)?;
            let mut raws = Vec::new();
            for row in rows {
                raws.push(row?);
            }
            Ok(raws)
        })?;

        let mut decoded = Vec::with_capacity(raws.len());
        for raw in raws {
            match raw.decode() {
                Ok(row) => decoded.push(row),
                Err(e) => tracing::warn!("Skipping unreadable scheduled notification: {e}"),
            }
        }
        Ok(decoded)
    }

    /// Remove a pending notification. Returns `true` if it existed.
    pub fn delete_scheduled_notification(&self, id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM scheduled_notifications WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    pub fn count_scheduled_notifications(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM scheduled_notifications", [], |row| {
                row.get(0)
            })?;
            Ok(count)
        })
    }
}

struct RawRow {
    id: i64,
    title: String,
    body: String,
    data_json: String,
    fire_at_ms: i64,
    created_at: String,
}

impl RawRow {
    fn decode(self) -> Result<ScheduledRow, DbError> {
        let data = match serde_json::from_str::<Value>(&self.data_json) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                return Err(DbError::InvalidData(format!(
                    "scheduled notification {}: {e}",
                    self.id
                )));
            }
        };
        Ok(ScheduledRow {
            id: self.id,
            title: self.title,
            body: self.body,
            data,
            fire_at_ms: self.fire_at_ms,
            created_at: self.created_at,
        })
    }
}

fn read_raw_row(row: &rusqlite::Row<'_>) -> Result<RawRow, rusqlite::Error> {
    Ok(RawRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        data_json: row.get(3)?,
        fire_at_ms: row.get(4)?,
        created_at: row.get(5)?,
    })
}
