//! Cache Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::wait_for_shutdown;
use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for the specified interval between cleanup runs and
/// acquires a write lock on the cache store to remove expired entries.
/// Lookups already drop expired entries lazily; this task bounds how long
/// an unread entry keeps its memory.
///
/// # Arguments
/// * `cache` - shared reference to the cache store
/// * `tier` - tier name used in log records
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
/// * `shutdown` - stops the loop once `true` is sent
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::<Vec<Todo>>::new()));
/// let (shutdown_tx, shutdown_rx) = shutdown_channel();
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), "local", 1, shutdown_rx);
/// // Later, during shutdown:
/// shutdown_tx.send(true)?;
/// cleanup_handle.await?;
/// ```
pub fn spawn_cleanup_task<V>(
    cache: Arc<RwLock<CacheStore<V>>>,
    tier: &'static str,
    cleanup_interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            tier,
            "Starting cache cleanup task with interval of {} seconds", cleanup_interval_secs
        );

        loop {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };

            if removed > 0 {
                info!(tier, "Cache cleanup: removed {} expired entries", removed);
            } else {
                debug!(tier, "Cache cleanup: no expired entries found");
            }
        }

        debug!(tier, "Cache cleanup task stopped");
    })
}
