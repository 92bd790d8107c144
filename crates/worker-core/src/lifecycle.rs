//! Install/activate handling and stale cache cleanup.

use crate::platform::{CacheStorage, Clients, PlatformResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Namespaces removed because their name is not the current version.
    pub deleted: Vec<String>,
    pub claimed: usize,
}

/// Prepare the current cache namespace. A failure here does not block
/// installation.
pub fn install(caches: &dyn CacheStorage, cache_name: &str) {
    if let Err(e) = caches.open(cache_name) {
        tracing::warn!(cache = %cache_name, error = %e, "Failed to open cache during install");
    }
}

/// Delete every namespace whose name differs from `current`.
pub fn purge_stale_caches(
    caches: &dyn CacheStorage,
    current: &str,
) -> PlatformResult<Vec<String>> {
    let mut deleted = Vec::new();
    for name in caches.keys()? {
        if name == current {
            continue;
        }
        if caches.delete(&name)? {
            tracing::info!(cache = %name, "Deleted stale cache");
            deleted.push(name);
        }
    }
    Ok(deleted)
}

/// Purge stale caches, then take control of every open page. Clients are
/// only claimed once cleanup succeeded.
pub fn activate(
    caches: &dyn CacheStorage,
    clients: &dyn Clients,
    current: &str,
) -> PlatformResult<ActivationReport> {
    let deleted = purge_stale_caches(caches, current)?;
    let claimed = clients.claim()?;
    Ok(ActivationReport { deleted, claimed })
}
