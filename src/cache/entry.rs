//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use crate::cache::MAX_ENTRY_SIZE;

/// Longest TTL honoured; longer ones are clamped so `now + ttl` cannot overflow.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Entries are never mutated in place; a write replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant after which the entry is expired
    pub expires_at: Instant,
    /// Approximate footprint charged against the capacity
    pub approx_size: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` after `now`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time to live, clamped to [`MAX_TTL`]
    /// * `approx_size` - Footprint from [`entry_size`](crate::cache::entry_size),
    ///   clamped to [`MAX_ENTRY_SIZE`]
    /// * `now` - Current instant
    pub fn new(value: V, ttl: Duration, approx_size: u64, now: Instant) -> Self {
        Self {
            value,
            expires_at: now + ttl.min(MAX_TTL),
            approx_size: approx_size.min(MAX_ENTRY_SIZE),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is still live at exactly `expires_at` and
    /// expired strictly after it, so a TTL is honoured for its full duration.
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL, or zero once the entry has expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
