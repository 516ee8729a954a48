//! Expiry Sweeper
//!
//! The in-process store drops an expired entry only when that key is touched.
//! This task reclaims the rest on an interval.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryConnector;

/// Spawns a task that removes expired entries from every in-process node
/// every `interval_secs` seconds (minimum 1).
///
/// Abort the returned handle on shutdown.
pub fn spawn_sweep_task(store: MemoryConnector, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting expiry sweep every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: nothing to remove");
            }
        }
    })
}
