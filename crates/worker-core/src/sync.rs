//! Event sync bridge: asks open pages to re-derive their schedules.

use crate::message::PageMessage;
use crate::platform::{ClientQuery, Clients};
use crate::SYNC_EVENTS_TAG;

/// Handle a background-sync opportunity. Returns how many pages were told
/// to refresh. Failures are logged and never retried here.
pub fn handle_sync(clients: &dyn Clients, tag: &str, timestamp: i64) -> usize {
    if tag != SYNC_EVENTS_TAG {
        tracing::debug!(tag = %tag, "Ignoring sync event with unknown tag");
        return 0;
    }

    let pages = match clients.match_all(ClientQuery::windows()) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::error!(error = %e, "Event sync failed: cannot enumerate clients");
            return 0;
        }
    };

    let message = PageMessage::SyncEvents { timestamp };
    let mut notified = 0;
    for page in &pages {
        match clients.post_message(&page.id, &message) {
            Ok(()) => notified += 1,
            Err(e) => {
                tracing::error!(client_id = %page.id, error = %e, "Event sync failed for client")
            }
        }
    }
    tracing::info!(notified, total = pages.len(), "Event sync broadcast");
    notified
}
