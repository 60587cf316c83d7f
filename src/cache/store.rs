//! Cache Store Module
//!
//! Main cache engine: a map from key to recency node, where each node owns its
//! entry. The map, the recency order and the running size are only changed
//! together, by the methods below, so they always describe the same set of
//! entries. The store is not synchronised; [`Cache`](crate::cache::Cache)
//! wraps it in a single lock.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::cache::lru::{NodeId, RecencyList};
use crate::cache::{CacheEntry, CacheKey, CacheStats, BASE_OVERHEAD, MAX_CAPACITY};

// == Cache Store ==
/// Size-bounded storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key to recency node
    index: HashMap<CacheKey, NodeId>,
    /// Recency order; nodes own the entries
    recency: RecencyList<CacheKey, CacheEntry<V>>,
    /// BASE_OVERHEAD plus the approx_size of every present entry
    size: u64,
    /// Byte budget
    capacity: u64,
    /// Activity counters
    stats: CacheStats,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given byte budget, clamped to
    /// [`MAX_CAPACITY`].
    pub fn new(capacity: u64) -> Self {
        Self {
            index: HashMap::new(),
            recency: RecencyList::new(),
            size: BASE_OVERHEAD,
            capacity: capacity.min(MAX_CAPACITY),
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores an entry, replacing any entry under the same key.
    ///
    /// The new entry is charged before eviction runs, so least recently used
    /// entries are dropped until the incoming one fits. The new entry is linked
    /// only after that, so it is never its own eviction victim. An entry larger
    /// than the whole budget empties the store and is still inserted.
    ///
    /// Returns the number of entries evicted.
    pub fn set(&mut self, key: CacheKey, entry: CacheEntry<V>) -> usize {
        self.remove(key);

        self.size = self.size.saturating_add(entry.approx_size);
        let evicted = self.evict_to_capacity();

        let id = self.recency.push_front(key, entry);
        self.index.insert(key, id);
        evicted
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// An entry that has expired by `now` is removed and reported as a miss.
    pub fn get(&mut self, key: CacheKey, now: Instant) -> Option<&V> {
        let Some(&id) = self.index.get(&key) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self
            .recency
            .get(id)
            .is_some_and(|entry| entry.is_expired(now));
        if expired {
            self.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.recency.touch(id);
        self.recency.get(id).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Returns the entry under `key` without touching recency or counters.
    ///
    /// Expired entries are returned as well; check with
    /// [`CacheEntry::is_expired`].
    pub fn peek(&self, key: CacheKey) -> Option<&CacheEntry<V>> {
        self.index.get(&key).and_then(|&id| self.recency.get(id))
    }

    // == Remove ==
    /// Removes an entry by key, returning it if it was present.
    pub fn remove(&mut self, key: CacheKey) -> Option<CacheEntry<V>> {
        let id = self.index.remove(&key)?;
        let (_, entry) = self.recency.remove(id)?;
        self.size = self.size.saturating_sub(entry.approx_size);
        Some(entry)
    }

    // == Snapshot ==
    /// Copies the values of entries still live at `now`, most recent first.
    pub fn snapshot(&self, now: Instant) -> Vec<V>
    where
        V: Clone,
    {
        self.recency
            .iter()
            .filter(|(_, _, entry)| !entry.is_expired(now))
            .map(|(_, _, entry)| entry.value.clone())
            .collect()
    }

    // == Remove Matching ==
    /// Removes every entry whose value satisfies `predicate`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_matching<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        let matching: Vec<CacheKey> = self
            .recency
            .iter()
            .filter(|(_, _, entry)| predicate(&entry.value))
            .map(|(_, key, _)| *key)
            .collect();

        let count = matching.len();
        for key in matching {
            self.remove(key);
        }
        count
    }

    // == Remove Expired ==
    /// Removes all entries expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<CacheKey> = self
            .recency
            .iter()
            .filter(|(_, _, entry)| entry.is_expired(now))
            .map(|(_, key, _)| *key)
            .collect();

        let count = expired.len();
        for key in expired {
            self.remove(key);
        }
        self.stats.record_expirations(count);
        count
    }

    // == Clear ==
    /// Drops every entry and resets the running size to the base overhead.
    pub fn clear(&mut self) {
        self.index = HashMap::new();
        self.recency.clear();
        self.size = BASE_OVERHEAD;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            size_bytes: self.size,
            capacity_bytes: self.capacity,
            ..self.stats.clone()
        }
    }

    /// Returns the running size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.index.len(), self.recency.len());
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recency.is_empty()
    }

    fn evict_to_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.size > self.capacity {
            let Some((key, entry)) = self.recency.evict_oldest() else {
                break;
            };
            self.index.remove(&key);
            self.size = self.size.saturating_sub(entry.approx_size);
            evicted += 1;
        }

        if evicted > 0 {
            self.stats.record_evictions(evicted);
            debug!(
                evicted,
                size = self.size,
                capacity = self.capacity,
                "Evicted least recently used entries"
            );
        }
        evicted
    }
}
