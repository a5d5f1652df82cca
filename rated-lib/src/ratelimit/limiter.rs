//! The limiter: slot selection, override resolution and locking.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use super::bucket::Bucket;
use super::hasher::{KeyHasher, SeededHasher};
use super::table::{slot_for, BucketTable};
use crate::error::{RatedError, Result};

/// Outcome of a single admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A token was taken; the request may proceed.
    Allowed,
    /// The bucket is empty; the request should be rejected.
    Limited,
}

impl Decision {
    /// Returns true if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Returns true if the request is limited.
    pub fn is_limited(&self) -> bool {
        matches!(self, Decision::Limited)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allowed
        } else {
            Decision::Limited
        }
    }
}

/// Per-call replacements for the limiter's default burst and refill interval.
///
/// A value of zero means the same as `None`: the limiter default applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub burst: Option<u32>,
    pub refill: Option<Duration>,
}

impl Overrides {
    /// No overrides; use the limiter defaults.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(burst: Option<u32>, refill: Option<Duration>) -> Self {
        Self { burst, refill }
    }

    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    pub fn with_refill(mut self, refill: Duration) -> Self {
        self.refill = Some(refill);
        self
    }

    fn resolve(&self, default_burst: u32, default_refill: Duration) -> (u32, Duration) {
        let burst = self.burst.filter(|b| *b > 0).unwrap_or(default_burst);
        let refill = self
            .refill
            .filter(|r| !r.is_zero())
            .unwrap_or(default_refill);
        (burst, refill)
    }
}

/// Token-bucket rate limiter keyed by arbitrary strings.
///
/// Memory is fixed at construction: `bucket_count` buckets, whatever the
/// number of distinct keys. Keys that hash onto the same slot share one bucket.
///
/// One mutex guards the whole table. The critical section is a single
/// bucket's read-modify-write and never blocks on I/O.
pub struct Limiter<H = SeededHasher> {
    burst: u32,
    refill: Duration,
    hasher: H,
    table: Mutex<BucketTable>,
    bucket_count: usize,
}

impl Limiter<SeededHasher> {
    /// Create a limiter with the fixed-seed hasher.
    ///
    /// # Errors
    /// Returns [`RatedError::Config`] if `buckets`, `burst` or `refill` is zero.
    pub fn new(buckets: usize, burst: u32, refill: Duration) -> Result<Self> {
        Self::with_hasher(buckets, burst, refill, SeededHasher::fixed())
    }
}

impl<H: KeyHasher> Limiter<H> {
    /// Create a limiter that selects slots with `hasher`.
    ///
    /// # Errors
    /// Returns [`RatedError::Config`] if `buckets`, `burst` or `refill` is zero.
    pub fn with_hasher(buckets: usize, burst: u32, refill: Duration, hasher: H) -> Result<Self> {
        if buckets == 0 {
            return Err(RatedError::Config("bucket count must be positive".into()));
        }
        if burst == 0 {
            return Err(RatedError::Config("burst must be positive".into()));
        }
        if refill.is_zero() {
            return Err(RatedError::Config("refill interval must be positive".into()));
        }

        Ok(Self {
            burst,
            refill,
            hasher,
            table: Mutex::new(BucketTable::new(buckets)),
            bucket_count: buckets,
        })
    }

    /// Decide whether a request for `key` is admitted now.
    ///
    /// Overrides that are absent or zero fall back to the limiter defaults.
    /// Never fails.
    pub fn decide(&self, key: &str, overrides: Overrides) -> Decision {
        self.decide_at(key, overrides, Instant::now())
    }

    /// Same as [`Limiter::decide`] with an explicit current instant.
    pub fn decide_at(&self, key: &str, overrides: Overrides, now: Instant) -> Decision {
        let (burst, refill) = overrides.resolve(self.burst, self.refill);
        let slot = self.slot(key);

        let allowed = {
            let mut table = self.lock_table();
            table
                .get_mut(slot)
                .is_some_and(|bucket| bucket.admit(now, f64::from(burst), refill))
        };

        trace!(slot, burst, ?refill, allowed, "bucket decision");
        Decision::from(allowed)
    }

    /// Slot `key` maps to: `hash(key) mod bucket_count`.
    pub fn slot(&self, key: &str) -> usize {
        // The slot count never changes, so indexing does not need the lock.
        slot_for(self.hasher.hash_key(key), self.bucket_count)
    }

    /// Snapshot of the bucket at `slot`.
    pub fn bucket(&self, slot: usize) -> Option<Bucket> {
        self.lock_table().get(slot).copied()
    }

    /// Forget all state: every bucket goes back to "never used".
    pub fn reset(&self) {
        self.lock_table().reset();
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn default_burst(&self) -> u32 {
        self.burst
    }

    pub fn default_refill(&self) -> Duration {
        self.refill
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    fn lock_table(&self) -> MutexGuard<'_, BucketTable> {
        // A panic mid-update can at worst leave one bucket with stale numbers;
        // the table itself stays usable.
        self.table.lock().unwrap_or_else(|poisoned| {
            warn!("bucket table lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<H> std::fmt::Debug for Limiter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Limiter")
            .field("bucket_count", &self.bucket_count)
            .field("burst", &self.burst)
            .field("refill", &self.refill)
            .finish_non_exhaustive()
    }
}
