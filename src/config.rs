//! Configuration Module
//!
//! Handles loading cache and load-driver settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default interval between expiration sweeps, in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 120;

/// Construction-time cache parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Byte budget; None derives one from available memory
    pub capacity_bytes: Option<u64>,
    /// Interval between background expiration sweeps
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY_BYTES` - Byte budget (default: derived from available memory)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep interval in seconds (default: 120)
    pub fn from_env() -> Self {
        Self {
            capacity_bytes: env_var("CACHE_CAPACITY_BYTES"),
            sweep_interval: Duration::from_secs(
                env_var("CACHE_SWEEP_INTERVAL_SECS").unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
            ),
        }
    }

    /// Overrides the byte budget.
    pub fn with_capacity_bytes(mut self, capacity_bytes: u64) -> Self {
        self.capacity_bytes = Some(capacity_bytes);
        self
    }

    /// Overrides the sweep interval.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: None,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Workload parameters for the load driver binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Number of concurrent writer threads
    pub workers: usize,
    /// Set/Get pairs performed by each worker
    pub ops_per_worker: usize,
    /// TTL applied to every written entry
    pub ttl: Duration,
}

impl LoadConfig {
    /// Creates a new LoadConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOAD_WORKERS` - Concurrent workers (default: 2)
    /// - `LOAD_OPS_PER_WORKER` - Operations per worker (default: 10000)
    /// - `LOAD_TTL_SECS` - Entry TTL in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workers: env_var("LOAD_WORKERS").unwrap_or(defaults.workers),
            ops_per_worker: env_var("LOAD_OPS_PER_WORKER").unwrap_or(defaults.ops_per_worker),
            ttl: env_var("LOAD_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            ops_per_worker: 10_000,
            ttl: Duration::from_secs(1),
        }
    }
}

fn env_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
