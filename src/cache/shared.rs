//! Shared Cache Module
//!
//! Thread-safe cache façade. One mutex guards the whole store (map,
//! recency order and running size), and the same store is shared with the
//! expiration sweeper.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use lru_ttl_cache::{Cache, CacheConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> lru_ttl_cache::error::Result<()> {
//! let cache: Cache<String> = Cache::new(CacheConfig::default().with_capacity_bytes(1 << 20))?;
//!
//! cache.set("greeting", "hello".to_string(), Duration::from_secs(60));
//! assert_eq!(cache.get("greeting").as_deref(), Some("hello"));
//!
//! cache.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::cache::{
    entry_size, ApproxSize, ApproxSizeEstimator, CacheEntry, CacheKey, CacheStats, CacheStore,
    CapacityGovernor, Clock, SizeEstimator, SystemClock,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{self, spawn_sweeper, Sweeper};

// == Cache Builder ==
/// Assembles a [`Cache`] from configuration and its collaborators.
pub struct CacheBuilder<V> {
    config: CacheConfig,
    estimator: Arc<dyn SizeEstimator<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: ApproxSize + 'static> CacheBuilder<V> {
    /// Starts a builder that sizes values through [`ApproxSize`].
    pub fn new(config: CacheConfig) -> Self {
        Self::with_estimator(config, ApproxSizeEstimator)
    }
}

impl<V: 'static> CacheBuilder<V> {
    /// Starts a builder with an explicit size estimator.
    pub fn with_estimator<E: SizeEstimator<V> + 'static>(config: CacheConfig, estimator: E) -> Self {
        Self {
            config,
            estimator: Arc::new(estimator),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the size estimator.
    pub fn estimator<E: SizeEstimator<V> + 'static>(mut self, estimator: E) -> Self {
        self.estimator = Arc::new(estimator);
        self
    }

    /// Replaces the clock used for expiry decisions.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<V: Send + 'static> CacheBuilder<V> {
    /// Resolves the capacity and starts the expiration sweeper.
    ///
    /// Must be called from within a Tokio runtime, which hosts the sweeper.
    ///
    /// # Errors
    /// - [`CacheError::InvalidCapacity`] for a budget that cannot hold an entry
    /// - [`CacheError::InvalidSweepInterval`] for a zero interval
    /// - [`CacheError::NoRuntime`] outside a Tokio runtime
    pub fn build(self) -> Result<Cache<V>> {
        let capacity = CapacityGovernor::from_config(&self.config)?;
        if self.config.sweep_interval.is_zero() {
            return Err(CacheError::InvalidSweepInterval);
        }
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let store = Arc::new(Mutex::new(CacheStore::new(capacity.bytes())));
        let sweeper = spawn_sweeper(
            store.clone(),
            self.clock.clone(),
            self.config.sweep_interval,
            &runtime,
        );

        info!(
            capacity_bytes = capacity.bytes(),
            sweep_interval_secs = self.config.sweep_interval.as_secs_f64(),
            "Cache initialized"
        );

        Ok(Cache {
            store,
            estimator: self.estimator,
            clock: self.clock,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }
}

// == Cache ==
/// Size-bounded in-process cache with LRU eviction and per-entry TTL.
///
/// Every operation, reads included, takes the same exclusive lock: a hit
/// reorders the recency list. Dropping the cache ends its sweeper; call
/// [`Cache::shutdown`] to also wait for it.
pub struct Cache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
    estimator: Arc<dyn SizeEstimator<V>>,
    clock: Arc<dyn Clock>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<V: ApproxSize + Send + 'static> Cache<V> {
    /// Builds a cache that sizes values through [`ApproxSize`].
    pub fn new(config: CacheConfig) -> Result<Self> {
        CacheBuilder::new(config).build()
    }

    pub fn builder(config: CacheConfig) -> CacheBuilder<V> {
        CacheBuilder::new(config)
    }
}

impl<V> Cache<V> {
    // == Get ==
    /// Returns a copy of the value under `key` and marks it most recently used.
    ///
    /// An expired entry is removed by the read and reported as absent.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let key = CacheKey::of(key);
        let mut store = self.store.lock();
        let now = self.clock.now();
        store.get(key, now).cloned()
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, evicting least recently used
    /// entries as needed. Always succeeds; the key is present afterwards.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let approx_size = entry_size(key, self.estimator.estimate(&value));
        let hashed = CacheKey::of(key);

        let mut store = self.store.lock();
        let entry = CacheEntry::new(value, ttl, approx_size, self.clock.now());
        store.set(hashed, entry);
    }

    // == Delete ==
    /// Removes `key` if present.
    pub fn delete(&self, key: &str) {
        self.store.lock().remove(CacheKey::of(key));
    }

    // == Filter ==
    /// Returns the live values that satisfy `predicate`.
    ///
    /// Values are copied under the lock and `predicate` runs after it is
    /// released, so concurrent writes may or may not be reflected.
    pub fn filter<F>(&self, predicate: F) -> Vec<V>
    where
        V: Clone,
        F: Fn(&V) -> bool,
    {
        let snapshot = {
            let store = self.store.lock();
            store.snapshot(self.clock.now())
        };
        snapshot.into_iter().filter(|value| predicate(value)).collect()
    }

    // == Delete Matching ==
    /// Removes every entry whose value satisfies `predicate`, under a single
    /// hold of the lock. Returns the number of entries removed.
    pub fn delete_matching<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        self.store.lock().remove_matching(predicate)
    }

    // == Prune ==
    /// Discards every entry.
    pub fn prune(&self) {
        self.store.lock().clear();
        debug!("Cache pruned");
    }

    /// Remaining time to live of a live entry, without promoting it.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let store = self.store.lock();
        let now = self.clock.now();
        store
            .peek(CacheKey::of(key))
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    /// Runs one expiration sweep now. Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        tasks::sweep(&self.store, self.clock.as_ref())
    }

    // == Size ==
    /// Running size in bytes: the base overhead plus every entry's footprint.
    pub fn size(&self) -> u64 {
        self.store.lock().size()
    }

    pub fn capacity(&self) -> u64 {
        self.store.lock().capacity()
    }

    /// Number of present entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    // == Shutdown ==
    /// Stops the expiration sweeper and waits for it to exit.
    ///
    /// The cache stays usable afterwards, without background sweeps.
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&self) {
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.stop().await;
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.lock();
        f.debug_struct("Cache")
            .field("entries", &store.len())
            .field("size", &store.size())
            .field("capacity", &store.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, BASE_OVERHEAD};

    fn config(capacity: u64) -> CacheConfig {
        CacheConfig::default().with_capacity_bytes(capacity)
    }

    #[test]
    fn test_build_outside_runtime_fails() {
        let result: Result<Cache<String>> = Cache::new(config(4096));
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_build_rejects_zero_capacity() {
        let result: Result<Cache<String>> = Cache::new(config(0));
        assert!(matches!(result, Err(CacheError::InvalidCapacity(0))));
    }

    #[tokio::test]
    async fn test_build_rejects_zero_sweep_interval() {
        let result: Result<Cache<String>> =
            Cache::new(config(4096).with_sweep_interval(Duration::ZERO));
        assert!(matches!(result, Err(CacheError::InvalidSweepInterval)));
    }

    #[tokio::test]
    async fn test_set_charges_estimated_size() {
        let cache: Cache<String> =
            CacheBuilder::with_estimator(config(4096), |v: &String| v.len() as u64)
                .build()
                .unwrap();

        cache.set("key", "12345".to_string(), Duration::from_secs(60));

        assert_eq!(cache.size(), BASE_OVERHEAD + entry_size("key", 5));
        assert_eq!(cache.capacity(), 4096);
        assert_eq!(cache.len(), 1);
        cache.shutdown().await;
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining_time() {
        let clock = Arc::new(ManualClock::new());
        let cache: Cache<String> = Cache::builder(config(4096))
            .clock(clock.clone())
            .build()
            .unwrap();

        cache.set("key", "value".to_string(), Duration::from_secs(10));
        clock.advance(Duration::from_secs(4));
        assert_eq!(cache.ttl("key"), Some(Duration::from_secs(6)));

        clock.advance(Duration::from_secs(7));
        assert_eq!(cache.ttl("key"), None);
        assert_eq!(cache.ttl("missing"), None);
        cache.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_and_cache_stays_usable() {
        let cache: Cache<String> = Cache::new(config(4096)).unwrap();

        cache.shutdown().await;
        cache.shutdown().await;

        cache.set("key", "value".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get("key"), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_debug_output() {
        let cache: Cache<String> = Cache::new(config(4096)).unwrap();
        let shown = format!("{cache:?}");
        assert!(shown.contains("capacity: 4096"));
        cache.shutdown().await;
    }
}
