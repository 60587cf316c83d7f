//! Size Estimation Module
//!
//! Approximate byte footprints used for capacity accounting. The figures only
//! need to be consistent, not exact: they decide when to evict, nothing else.
//!
//! A value's footprint comes from a [`SizeEstimator`]. The default one,
//! [`ApproxSizeEstimator`], asks the value itself through [`ApproxSize`]; any
//! `Fn(&V) -> u64` closure works as well, which is how tests plug in a
//! deterministic stub.
//!
//! # Example
//! ```
//! use lru_ttl_cache::cache::{entry_size, ApproxSize, SizeEstimator, ENTRY_OVERHEAD};
//!
//! let by_len = |v: &String| v.len() as u64;
//! assert_eq!(by_len.estimate(&"abcd".to_string()), 4);
//! assert_eq!(entry_size("k", 4), 1 + 4 + ENTRY_OVERHEAD);
//! assert!("abcd".to_string().approx_size() >= 4);
//! ```

use std::mem::size_of;
use std::rc::Rc;
use std::sync::Arc;

/// Bytes charged for one timestamp
const TIMESTAMP_SIZE: u64 = 24;
/// Bytes charged for one size field
const SIZE_FIELD: u64 = 8;
/// Bytes charged for the map reference inside the container
const MAP_REFERENCE_SIZE: u64 = 24;
/// Bytes charged for the lock guarding the container
const LOCK_SIZE: u64 = 24;

/// Fixed cost of every entry on top of its key and value: two timestamps and one size field.
pub const ENTRY_OVERHEAD: u64 = 2 * TIMESTAMP_SIZE + SIZE_FIELD;

/// Fixed cost of an empty cache. The running size never drops below this.
pub const BASE_OVERHEAD: u64 = MAP_REFERENCE_SIZE + 2 * SIZE_FIELD + LOCK_SIZE;

/// Largest footprint charged for one entry.
///
/// With capacities capped at [`MAX_CAPACITY`], the running size stays below
/// `u64::MAX` even with an oversized entry on top of a full store.
pub const MAX_ENTRY_SIZE: u64 = u64::MAX / 4;

/// Largest byte budget a cache accepts; bigger budgets are clamped to it.
pub const MAX_CAPACITY: u64 = u64::MAX / 4;

/// Returns the approximate footprint of an entry stored under `key`, capped
/// at [`MAX_ENTRY_SIZE`].
pub fn entry_size(key: &str, value_size: u64) -> u64 {
    (key.len() as u64)
        .saturating_add(value_size)
        .saturating_add(ENTRY_OVERHEAD)
        .min(MAX_ENTRY_SIZE)
}

// == Approx Size ==
/// Types that can report their own approximate footprint in bytes.
///
/// Owned containers report their inline header plus their heap contents.
pub trait ApproxSize {
    fn approx_size(&self) -> u64;
}

macro_rules! inline_size {
    ($($t:ty),* $(,)?) => {
        $(
            impl ApproxSize for $t {
                #[inline]
                fn approx_size(&self) -> u64 {
                    size_of::<$t>() as u64
                }
            }
        )*
    };
}

inline_size!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, ());

impl ApproxSize for str {
    fn approx_size(&self) -> u64 {
        self.len() as u64
    }
}

impl ApproxSize for String {
    fn approx_size(&self) -> u64 {
        size_of::<String>() as u64 + self.len() as u64
    }
}

impl<T: ApproxSize> ApproxSize for Vec<T> {
    fn approx_size(&self) -> u64 {
        self.iter()
            .fold(size_of::<Vec<T>>() as u64, |acc, item| {
                acc.saturating_add(item.approx_size())
            })
    }
}

impl<T: ApproxSize> ApproxSize for [T] {
    fn approx_size(&self) -> u64 {
        self.iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.approx_size()))
    }
}

impl<T: ApproxSize> ApproxSize for Option<T> {
    fn approx_size(&self) -> u64 {
        match self {
            Some(value) => value.approx_size(),
            None => size_of::<Self>() as u64,
        }
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Box<T> {
    fn approx_size(&self) -> u64 {
        size_of::<Box<T>>() as u64 + (**self).approx_size()
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Arc<T> {
    fn approx_size(&self) -> u64 {
        size_of::<Arc<T>>() as u64 + (**self).approx_size()
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Rc<T> {
    fn approx_size(&self) -> u64 {
        size_of::<Rc<T>>() as u64 + (**self).approx_size()
    }
}

impl<A: ApproxSize, B: ApproxSize> ApproxSize for (A, B) {
    fn approx_size(&self) -> u64 {
        self.0.approx_size().saturating_add(self.1.approx_size())
    }
}

// == Size Estimator ==
/// Maps a value to its approximate footprint in bytes.
pub trait SizeEstimator<V>: Send + Sync {
    fn estimate(&self, value: &V) -> u64;
}

/// Estimator that defers to the value's own [`ApproxSize`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxSizeEstimator;

impl<V: ApproxSize> SizeEstimator<V> for ApproxSizeEstimator {
    #[inline]
    fn estimate(&self, value: &V) -> u64 {
        value.approx_size()
    }
}

impl<V, F> SizeEstimator<V> for F
where
    F: Fn(&V) -> u64 + Send + Sync,
{
    #[inline]
    fn estimate(&self, value: &V) -> u64 {
        self(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_constants() {
        assert_eq!(ENTRY_OVERHEAD, 56);
        assert_eq!(BASE_OVERHEAD, 64);
    }

    #[test]
    fn test_entry_size_adds_key_value_and_overhead() {
        assert_eq!(entry_size("abc", 10), 3 + 10 + ENTRY_OVERHEAD);
        assert_eq!(entry_size("", 0), ENTRY_OVERHEAD);
    }

    #[test]
    fn test_entry_size_is_capped() {
        assert_eq!(entry_size("k", u64::MAX), MAX_ENTRY_SIZE);
        assert_eq!(
            entry_size("k", MAX_ENTRY_SIZE - 100),
            MAX_ENTRY_SIZE - 100 + 1 + ENTRY_OVERHEAD
        );
        // An over-budget store plus one more capped entry cannot saturate
        let worst = MAX_CAPACITY
            .checked_add(MAX_ENTRY_SIZE)
            .and_then(|size| size.checked_add(MAX_ENTRY_SIZE));
        assert!(worst.is_some());
    }

    #[test]
    fn test_string_counts_header_and_bytes() {
        let value = "hello".to_string();
        assert_eq!(value.approx_size(), size_of::<String>() as u64 + 5);
        assert_eq!("hello".approx_size(), 5);
    }

    #[test]
    fn test_vec_sums_items() {
        let bytes: Vec<u8> = vec![0; 100];
        assert_eq!(bytes.approx_size(), size_of::<Vec<u8>>() as u64 + 100);

        let words = vec!["ab".to_string(), "cde".to_string()];
        let expected = size_of::<Vec<String>>() as u64 + 2 * size_of::<String>() as u64 + 5;
        assert_eq!(words.approx_size(), expected);
    }

    #[test]
    fn test_smart_pointers_include_pointee() {
        let shared: Arc<str> = Arc::from("abcd");
        assert_eq!(shared.approx_size(), size_of::<Arc<str>>() as u64 + 4);

        let boxed = Box::new(7u64);
        assert_eq!(boxed.approx_size(), size_of::<Box<u64>>() as u64 + 8);
    }

    #[test]
    fn test_option_and_tuple() {
        assert_eq!(Some(1u32).approx_size(), 4);
        assert_eq!(None::<u32>.approx_size(), size_of::<Option<u32>>() as u64);
        assert_eq!((1u8, 2u64).approx_size(), 9);
    }

    #[test]
    fn test_default_estimator_delegates() {
        let value = "xyz".to_string();
        assert_eq!(ApproxSizeEstimator.estimate(&value), value.approx_size());
    }

    #[test]
    fn test_closure_estimator() {
        let fixed = |_: &String| 40u64;
        assert_eq!(fixed.estimate(&"anything".to_string()), 40);
    }
}
