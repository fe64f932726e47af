use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lrukit::LruCache;
use lrukit::builder::CacheBuilder;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 1024;

fn filled(capacity: usize) -> LruCache<u64, u64> {
    let mut cache = CacheBuilder::new(capacity).build();
    for i in 0..capacity as u64 {
        cache.set(i, i);
    }
    cache
}

/// 80% of accesses go to 20% of a key space four times the capacity.
fn hotset_keys(len: usize, seed: u64) -> Vec<u64> {
    let universe = (CAPACITY * 4) as u64;
    let hot = universe / 5;
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.random_range(0..100) < 80 {
                rng.random_range(0..hot)
            } else {
                rng.random_range(hot..universe)
            }
        })
        .collect()
}

fn bench_set_get(c: &mut Criterion) {
    c.bench_function("lru_set_get", |b| {
        b.iter_batched(
            || filled(CAPACITY),
            |mut cache| {
                for i in 0..CAPACITY as u64 {
                    cache.set(black_box(i + 10_000), i);
                    let _ = black_box(cache.get(&black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_eviction_churn(c: &mut Criterion) {
    c.bench_function("lru_eviction_churn", |b| {
        b.iter_batched(
            || filled(CAPACITY),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.set(black_box(10_000 + i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pop_lru(c: &mut Criterion) {
    c.bench_function("lru_pop_lru", |b| {
        b.iter_batched(
            || filled(CAPACITY),
            |mut cache| {
                while let Some(entry) = cache.pop_lru() {
                    black_box(entry);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_hotset_read_through(c: &mut Criterion) {
    let keys = hotset_keys(8192, 42);
    let mut group = c.benchmark_group("lru_hotset_read_through");
    group.throughput(Throughput::Elements(keys.len() as u64));
    for load_factor in [1usize, 4, 16] {
        let buckets = (CAPACITY / load_factor).max(1);
        group.bench_with_input(BenchmarkId::from_parameter(load_factor), &keys, |b, keys| {
            b.iter_batched(
                || CacheBuilder::new(CAPACITY).bucket_count(buckets).build(),
                |mut cache: LruCache<u64, u64>| {
                    for &key in keys {
                        if cache.get(&key).is_none() {
                            cache.set(key, key);
                        }
                    }
                    cache
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_string_keys(c: &mut Criterion) {
    let keys: Vec<String> = hotset_keys(4096, 7)
        .into_iter()
        .map(|k| format!("user:{k:08}"))
        .collect();
    c.bench_function("lru_string_keys", |b| {
        b.iter_batched(
            || LruCache::new(CAPACITY),
            |mut cache: LruCache<String, usize>| {
                for (i, key) in keys.iter().enumerate() {
                    if cache.get(key.as_str()).is_none() {
                        cache.set(key.clone(), i);
                    }
                }
                cache
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_set_get,
    bench_eviction_churn,
    bench_pop_lru,
    bench_hotset_read_through,
    bench_string_keys
);
criterion_main!(benches);
