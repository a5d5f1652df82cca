//! Token-bucket admission control over a fixed-size table of buckets.
//!
//! Keys are never stored. Each key is hashed onto one slot of a table that is
//! allocated once at construction, so memory use depends only on the number of
//! buckets and not on how many distinct keys are seen. Distinct keys may share
//! a slot and then share its token budget.
//!
//! # Architecture
//!
//! 1. **KeyHasher** (`hasher.rs`): maps a key to a 64-bit value that is stable
//!    for the lifetime of one limiter.
//!
//! 2. **Bucket** (`bucket.rs`): token count plus last access instant, refilled
//!    lazily from elapsed time on every access.
//!
//! 3. **BucketTable** (`table.rs`): the pre-allocated slot array.
//!
//! 4. **Limiter** (`limiter.rs`): resolves per-call overrides, picks the slot
//!    and runs the bucket decision under a single lock.
//!
//! # Example Usage
//!
//! ```
//! use rated_lib::ratelimit::{Limiter, Overrides};
//! use std::time::Duration;
//!
//! let limiter = Limiter::new(10, 2, Duration::from_secs(1))?;
//!
//! assert!(limiter.decide("foo", Overrides::none()).is_allowed());
//! assert!(limiter.decide("foo", Overrides::none()).is_allowed());
//! assert!(limiter.decide("foo", Overrides::none()).is_limited());
//! # Ok::<(), rated_lib::RatedError>(())
//! ```

mod bucket;
mod hasher;
mod limiter;
mod table;

pub use bucket::Bucket;
pub use hasher::{Fnv1a, KeyHasher, SeededHasher};
pub use limiter::{Decision, Limiter, Overrides};
pub use table::BucketTable;
