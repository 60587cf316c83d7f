//! Expiration Sweeper
//!
//! Background task that periodically removes expired cache entries, so keys
//! that are never read again do not hold on to their bytes.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, Clock};

/// Handle to a running sweeper.
///
/// [`Sweeper::stop`] cancels the task and waits for it to finish. Dropping
/// the handle also ends the task at its next wake-up, without waiting.
#[derive(Debug)]
pub struct Sweeper {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Signals the task to stop and waits until it has exited.
    pub async fn stop(self) {
        // A closed channel means the task is already gone
        let _ = self.stop.send(true);
        if let Err(err) = self.handle.await {
            warn!(%err, "Expiration sweeper ended abnormally");
        }
    }
}

/// Spawns a task on `runtime` that sweeps `store` every `interval`.
///
/// Each pass holds the store lock while it collects and removes the entries
/// that have expired according to `clock`.
///
/// # Example
/// ```ignore
/// let sweeper = spawn_sweeper(store.clone(), clock, Duration::from_secs(120), &Handle::current());
/// // Later, during teardown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweeper<V: Send + 'static>(
    store: Arc<Mutex<CacheStore<V>>>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    runtime: &Handle,
) -> Sweeper {
    let (stop, mut stopped) = watch::channel(false);

    let handle = runtime.spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiration sweeper");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                // Fires on an explicit stop and when the handle is dropped
                _ = stopped.changed() => break,
            }

            let removed = sweep(&store, clock.as_ref());
            if removed > 0 {
                info!("Expiration sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiration sweep: no expired entries found");
            }
        }

        info!("Expiration sweeper stopped");
    });

    Sweeper { stop, handle }
}

/// Runs a single sweep pass, returning the number of entries removed.
pub fn sweep<V>(store: &Mutex<CacheStore<V>>, clock: &dyn Clock) -> usize {
    let mut guard = store.lock();
    let now = clock.now();
    guard.remove_expired(now)
}
