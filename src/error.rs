//! Error types for the cache
//!
//! Cache operations never fail; only building a cache can.

use thiserror::Error;

use crate::cache::BASE_OVERHEAD;

// == Cache Error Enum ==
/// Construction-time errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity too small to hold anything beyond the container overhead
    #[error("Invalid capacity: {0} bytes (must be greater than {min})", min = BASE_OVERHEAD)]
    InvalidCapacity(u64),

    /// Sweep interval of zero
    #[error("Invalid sweep interval: must be greater than zero")]
    InvalidSweepInterval,

    /// No Tokio runtime to host the expiration sweeper
    #[error("No Tokio runtime available to run the expiration sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_message() {
        let err = CacheError::InvalidCapacity(0);
        let msg = err.to_string();
        assert!(msg.contains("0 bytes"));
        assert!(msg.contains(&BASE_OVERHEAD.to_string()));
    }

    #[test]
    fn test_no_runtime_message() {
        assert!(CacheError::NoRuntime.to_string().contains("Tokio"));
    }
}
