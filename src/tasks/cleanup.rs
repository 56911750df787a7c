//! TTL Cleanup Task
//!
//! Background task that periodically removes expired in-process cache entries.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::store::{purge_expired, SharedEntries};

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task sleeps for `interval` between passes and takes the write lock
/// only for the duration of one pass.
///
/// Returns `None` when no tokio runtime is running or `interval` is zero;
/// the store then relies on lazy expiry alone.
///
/// # Example
/// ```ignore
/// let entries: SharedEntries<String> = Arc::new(RwLock::new(HashMap::new()));
/// let handle = spawn_cleanup_task(entries.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// if let Some(handle) = handle { handle.abort(); }
/// ```
pub fn spawn_cleanup_task<V>(entries: SharedEntries<V>, interval: Duration) -> Option<JoinHandle<()>>
where
    V: Send + Sync + 'static,
{
    if interval.is_zero() {
        warn!("sweep interval is zero; in-process cache will expire lazily only");
        return None;
    }

    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(err) => {
            warn!(error = %err, "no tokio runtime; in-process cache will expire lazily only");
            return None;
        }
    };

    Some(runtime.spawn(async move {
        info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Starting TTL cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = purge_expired(&entries);

            if removed > 0 {
                debug!(removed, "TTL cleanup removed expired entries");
            }
        }
    }))
}
