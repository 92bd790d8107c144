//! Host-side implementations of the worker's platform traits.

pub mod caches;
pub mod clients;
pub mod schedules;
pub mod tray;
pub mod window;

pub use caches::DbCacheStorage;
pub use clients::ClientRegistry;
pub use schedules::DbScheduleStore;
pub use tray::NotificationTray;
pub use window::WindowOpener;

use worker_core::PlatformError;

/// Map a storage failure into the worker's error space.
pub(crate) fn storage_error(e: recitation_db::DbError) -> PlatformError {
    PlatformError::Storage(e.to_string())
}
