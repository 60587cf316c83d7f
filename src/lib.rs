//! LRU TTL Cache - A generic in-process cache bounded by size
//!
//! Combines LRU eviction, per-entry TTL expiration and an aggregate byte budget.

pub mod cache;
pub mod config;
pub mod error;
pub(crate) mod tasks;

pub use cache::{Cache, CacheBuilder, CacheStats};
pub use config::{CacheConfig, LoadConfig};
pub use error::CacheError;
