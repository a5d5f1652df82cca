//! Micro benchmarks for key hashing and the admission decision.
//! Pure CPU - no network, no IO.
//!
//! ```bash
//! cargo bench --bench bench_limiter
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use rated_lib::ratelimit::{Fnv1a, KeyHasher, Limiter, Overrides, SeededHasher};
use std::hint::black_box;
use std::time::Duration;

const TEST_KEY: &str = "hello, world";

fn bench_hashers(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_key");

    let seeded = SeededHasher::fixed();
    group.bench_function("ahash_seeded", |b| {
        b.iter(|| seeded.hash_key(black_box(TEST_KEY)))
    });

    group.bench_function("fnv1a", |b| b.iter(|| Fnv1a.hash_key(black_box(TEST_KEY))));

    group.finish();
}

fn bench_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");

    // A one-nanosecond refill keeps the bucket full, so every call takes the
    // allowed path.
    if let Ok(limiter) = Limiter::new(100_000, 10, Duration::from_nanos(1)) {
        group.bench_function("single_key", |b| {
            b.iter(|| limiter.decide(black_box(TEST_KEY), Overrides::none()))
        });

        let keys: Vec<String> = (0..1024).map(|i| format!("client={i}")).collect();
        let mut next = 0usize;
        group.bench_function("rotating_keys", |b| {
            b.iter(|| {
                next = (next + 1) % keys.len();
                limiter.decide(black_box(&keys[next]), Overrides::none())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hashers, bench_decide);
criterion_main!(benches);
