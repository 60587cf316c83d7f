//! Cache Module
//!
//! In-process caching bounded by approximate byte size, with TTL expiration
//! and LRU eviction.

mod capacity;
mod clock;
mod entry;
mod key;
mod lru;
mod shared;
mod size;
mod stats;
mod store;


// Re-export public types
pub use capacity::{available_memory, derive_capacity, DEFAULT_CAPACITY_CEILING};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::MAX_TTL;
pub use shared::{Cache, CacheBuilder};
pub use size::{
    entry_size, ApproxSize, ApproxSizeEstimator, SizeEstimator, BASE_OVERHEAD, ENTRY_OVERHEAD,
    MAX_CAPACITY, MAX_ENTRY_SIZE,
};
pub use stats::CacheStats;

// Internal building blocks; callers go through `Cache` and its single lock
pub(crate) use capacity::CapacityGovernor;
pub(crate) use entry::CacheEntry;
pub(crate) use key::CacheKey;
pub(crate) use store::CacheStore;
