//! Named cache namespaces.
//!
//! Only the namespace registry is persisted; a namespace is the unit the
//! worker purges when its version constant changes.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheNamespace {
    pub name: String,
    pub created_at: String,
}

impl Database {
    /// Create the namespace if it does not exist yet. Returns `true` when created.
    pub fn open_cache_namespace(&self, name: &str) -> Result<bool, DbError> {
        if name.is_empty() {
            return Err(DbError::InvalidData("cache name must not be empty".into()));
        }
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO cache_namespaces (name, created_at) VALUES (?1, CURRENT_TIMESTAMP)",
                [name],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn cache_namespace_names(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM cache_namespaces ORDER BY created_at, name")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut names = Vec::new();
            for row in rows {
                names.push(row?);
            }
            Ok(names)
        })
    }

    pub fn get_cache_namespace(&self, name: &str) -> Result<Option<CacheNamespace>, DbError> {
        self.with_conn(|conn| {
            let entry = conn
                .query_row(
                    "SELECT name, created_at FROM cache_namespaces WHERE name = ?1",
                    [name],
                    |row| {
                        Ok(CacheNamespace {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(entry)
        })
    }

    pub fn list_cache_namespaces(&self) -> Result<Vec<CacheNamespace>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, created_at FROM cache_namespaces ORDER BY created_at, name",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(CacheNamespace {
                    name: row.get(0)?,
                    created_at: row.get(1)?,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
    }

    /// Delete a namespace. Returns `true` if it existed.
    pub fn delete_cache_namespace(&self, name: &str) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM cache_namespaces WHERE name = ?1", [name])?;
            Ok(deleted > 0)
        })
    }
}
