//! Key hashing for slot selection.
//!
//! Hashers here are stateless per call, so concurrent callers never contend on
//! them. Output only has to be stable for one limiter; it is not a
//! cryptographic hash.

use ahash::RandomState;
use std::fmt;

/// Maps an arbitrary key to a 64-bit value.
///
/// Implementations must return the same value for the same key for as long as
/// the owning [`Limiter`](super::Limiter) lives.
pub trait KeyHasher: Send + Sync {
    fn hash_key(&self, key: &str) -> u64;
}

// Arbitrary constants; changing them remaps every key to a different slot.
const FIXED_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// aHash keyed by four seeds.
///
/// [`SeededHasher::fixed`] keeps the key to slot mapping identical across
/// restarts of the same build. [`SeededHasher::random`] draws seeds once, which
/// makes collisions harder to predict from outside at the cost of a different
/// mapping after every restart.
#[derive(Clone)]
pub struct SeededHasher {
    state: RandomState,
    randomized: bool,
}

impl SeededHasher {
    pub fn fixed() -> Self {
        let [k0, k1, k2, k3] = FIXED_SEEDS;
        Self { state: RandomState::with_seeds(k0, k1, k2, k3), randomized: false }
    }

    pub fn random() -> Self {
        Self { state: RandomState::new(), randomized: true }
    }

    /// Whether the seeds were drawn at construction.
    pub fn is_randomized(&self) -> bool {
        self.randomized
    }
}

impl Default for SeededHasher {
    fn default() -> Self {
        Self::fixed()
    }
}

impl fmt::Debug for SeededHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededHasher")
            .field("randomized", &self.randomized)
            .finish_non_exhaustive()
    }
}

impl KeyHasher for SeededHasher {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        self.state.hash_one(key)
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a.
///
/// Slower than [`SeededHasher`] on long keys, but the output is fixed by the
/// algorithm alone and identical on every platform and build.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1a;

impl KeyHasher for Fnv1a {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_vectors() {
        assert_eq!(Fnv1a.hash_key(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(Fnv1a.hash_key("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(Fnv1a.hash_key("foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_fixed_seeds_are_reproducible() {
        let a = SeededHasher::fixed();
        let b = SeededHasher::fixed();
        for key in ["foo", "bar", "user=1&page=2", ""] {
            assert_eq!(a.hash_key(key), b.hash_key(key), "key {key:?}");
        }
        assert!(!a.is_randomized());
    }

    #[test]
    fn test_random_hasher_is_stable_per_instance() {
        let hasher = SeededHasher::random();
        assert!(hasher.is_randomized());
        assert_eq!(hasher.hash_key("hello, world"), hasher.hash_key("hello, world"));
    }

    #[test]
    fn test_distinct_keys_spread() {
        let hasher = SeededHasher::fixed();
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            seen.insert(hasher.hash_key(&format!("key-{i}")));
        }
        assert_eq!(seen.len(), 1000);
    }
}
