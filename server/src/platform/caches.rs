//! Cache namespaces stored in SQLite.

use recitation_db::Database;
use worker_core::CacheStorage;
use worker_core::platform::PlatformResult;

use super::storage_error;

pub struct DbCacheStorage {
    db: Database,
}

impl DbCacheStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl CacheStorage for DbCacheStorage {
    fn open(&self, name: &str) -> PlatformResult<()> {
        if self.db.open_cache_namespace(name).map_err(storage_error)? {
            tracing::info!(cache = %name, "Cache namespace created");
        }
        Ok(())
    }

    fn keys(&self) -> PlatformResult<Vec<String>> {
        self.db.cache_namespace_names().map_err(storage_error)
    }

    fn delete(&self, name: &str) -> PlatformResult<bool> {
        self.db.delete_cache_namespace(name).map_err(storage_error)
    }
}
