//! Host settings table: one row per configuration key.
//!
//! Values are stored as text. Typed reads parse on the way out and report a
//! stored value that does not parse as [`DbError::InvalidData`].

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use rusqlite::OptionalExtension;

use crate::{Database, DbError};

/// A stored settings row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSetting {
    pub key: String,
    pub value: String,
    /// Masked when shown to pages.
    pub secret: bool,
}

fn kind(secret: bool) -> &'static str {
    if secret { "secret" } else { "normal" }
}

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    /// Read a setting and parse it as `T`. `Ok(None)` when the key is absent.
    pub fn get_setting_as<T>(&self, key: &str) -> Result<Option<T>, DbError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get_setting(key)?
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| DbError::InvalidData(format!("setting {key}={raw:?}: {e}")))
            })
            .transpose()
    }

    pub fn set_setting(&self, key: &str, value: &str, secret: bool) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, setting_type, updated_at) VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, setting_type = ?3, updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![key, value, kind(secret)],
            )?;
            Ok(())
        })
    }

    /// Store `value` only when `key` has no row yet. Returns whether a row
    /// was written.
    pub fn insert_setting_if_absent(
        &self,
        key: &str,
        value: &str,
        secret: bool,
    ) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO settings (key, value, setting_type) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, kind(secret)],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Every stored row, ordered by key.
    pub fn list_settings(&self) -> Result<Vec<StoredSetting>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT key, value, setting_type FROM settings ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok(StoredSetting {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    secret: row.get::<_, String>(2)? == "secret",
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    /// Write a batch in one transaction. Existing rows keep their kind.
    pub fn set_settings(&self, settings: &HashMap<String, String>) -> Result<(), DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                     ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP",
                )?;
                for (key, value) in settings {
                    stmt.execute(rusqlite::params![key, value])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}
