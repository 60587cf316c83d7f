//! Capacity Module
//!
//! Resolves the byte budget once, at construction. An explicit budget wins;
//! otherwise the budget is an eighth of available memory, capped at
//! [`DEFAULT_CAPACITY_CEILING`]. Nothing here is global or recomputed later.

use tracing::debug;

use crate::cache::BASE_OVERHEAD;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Upper bound for a derived budget (200 MB)
pub const DEFAULT_CAPACITY_CEILING: u64 = 200 * 1000 * 1000;

/// Fixed byte budget of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityGovernor {
    bytes: u64,
}

impl CapacityGovernor {
    /// Resolves the budget from configuration.
    ///
    /// Rejects explicit budgets that cannot hold anything beyond the
    /// container overhead.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        match config.capacity_bytes {
            Some(bytes) => Self::explicit(bytes),
            None => {
                let available = available_memory();
                let bytes = derive_capacity(available);
                debug!(?available, bytes, "Derived cache capacity from available memory");
                Ok(Self { bytes })
            }
        }
    }

    /// Uses an explicit budget.
    pub fn explicit(bytes: u64) -> Result<Self> {
        if bytes <= BASE_OVERHEAD {
            return Err(CacheError::InvalidCapacity(bytes));
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

/// Returns an eighth of `available`, capped at the ceiling.
///
/// Falls back to the ceiling when memory could not be detected.
pub fn derive_capacity(available: Option<u64>) -> u64 {
    match available {
        Some(bytes) => (bytes / 8).clamp(BASE_OVERHEAD + 1, DEFAULT_CAPACITY_CEILING),
        None => DEFAULT_CAPACITY_CEILING,
    }
}

/// Detects available memory in bytes.
///
/// Reads `MemAvailable` from `/proc/meminfo`, or `MemTotal` on kernels that
/// lack it. Returns None on other platforms.
pub fn available_memory() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|contents| parse_meminfo(&contents))
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo(contents: &str) -> Option<u64> {
    meminfo_field(contents, "MemAvailable:").or_else(|| meminfo_field(contents, "MemTotal:"))
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn meminfo_field(contents: &str, field: &str) -> Option<u64> {
    contents
        .lines()
        .find(|line| line.starts_with(field))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb.saturating_mul(1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       16384000 kB\n\
                           MemFree:         1024000 kB\n\
                           MemAvailable:    8192000 kB\n";

    #[test]
    fn test_explicit_capacity() {
        let governor = CapacityGovernor::explicit(4096).unwrap();
        assert_eq!(governor.bytes(), 4096);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            CapacityGovernor::explicit(0),
            Err(CacheError::InvalidCapacity(0))
        );
    }

    #[test]
    fn test_capacity_at_base_overhead_rejected() {
        assert!(CapacityGovernor::explicit(BASE_OVERHEAD).is_err());
        assert!(CapacityGovernor::explicit(BASE_OVERHEAD + 1).is_ok());
    }

    #[test]
    fn test_from_config_prefers_override() {
        let config = CacheConfig::default().with_capacity_bytes(100);
        assert_eq!(CapacityGovernor::from_config(&config).unwrap().bytes(), 100);
    }

    #[test]
    fn test_from_config_derives_default() {
        let governor = CapacityGovernor::from_config(&CacheConfig::default()).unwrap();
        assert!(governor.bytes() > BASE_OVERHEAD);
        assert!(governor.bytes() <= DEFAULT_CAPACITY_CEILING);
    }

    #[test]
    fn test_derive_capacity_takes_an_eighth() {
        assert_eq!(derive_capacity(Some(800 * 1000 * 1000)), 100 * 1000 * 1000);
    }

    #[test]
    fn test_derive_capacity_is_capped() {
        assert_eq!(derive_capacity(Some(64 << 30)), DEFAULT_CAPACITY_CEILING);
    }

    #[test]
    fn test_derive_capacity_undetected() {
        assert_eq!(derive_capacity(None), DEFAULT_CAPACITY_CEILING);
    }

    #[test]
    fn test_derive_capacity_tiny_machine() {
        assert_eq!(derive_capacity(Some(16)), BASE_OVERHEAD + 1);
    }

    #[test]
    fn test_parse_meminfo_prefers_available() {
        assert_eq!(parse_meminfo(MEMINFO), Some(8_192_000 * 1024));
    }

    #[test]
    fn test_parse_meminfo_falls_back_to_total() {
        let old_kernel = "MemTotal:       2048 kB\nMemFree:        1024 kB\n";
        assert_eq!(parse_meminfo(old_kernel), Some(2048 * 1024));
    }

    #[test]
    fn test_parse_meminfo_huge_value_saturates() {
        let absurd = format!("MemAvailable: {} kB\n", u64::MAX);
        assert_eq!(parse_meminfo(&absurd), Some(u64::MAX));
        assert_eq!(derive_capacity(parse_meminfo(&absurd)), DEFAULT_CAPACITY_CEILING);
    }

    #[test]
    fn test_parse_meminfo_garbage() {
        assert_eq!(parse_meminfo("nothing useful"), None);
    }
}
