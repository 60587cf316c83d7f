//! Cache Key Module
//!
//! Maps string keys onto fixed-width identifiers.

use xxhash_rust::xxh64::xxh64;

// == Cache Key ==
/// 64-bit identifier derived from a string key with xxHash64.
///
/// Distinct strings may collide; a colliding write replaces whatever entry
/// already lives under the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Hashes `key` into its identifier.
    pub fn of(key: &str) -> Self {
        Self(xxh64(key.as_bytes(), 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(CacheKey::of("user:42"), CacheKey::of("user:42"));
    }

    #[test]
    fn test_distinct_keys_differ() {
        assert_ne!(CacheKey::of("a"), CacheKey::of("b"));
        assert_ne!(CacheKey::of(""), CacheKey::of(" "));
    }

    #[test]
    fn test_matches_xxh64_seed_zero() {
        assert_eq!(CacheKey::of("abc"), CacheKey(xxh64(b"abc", 0)));
    }
}
