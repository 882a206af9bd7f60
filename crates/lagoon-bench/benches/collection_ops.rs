//! Criterion micro-benchmarks for pool-backed arrays and lists.

use std::hint::black_box;
use std::num::NonZeroUsize;

use criterion::{criterion_group, criterion_main, Criterion};
use lagoon_collections::{Array, List};
use lagoon_pool::{Pool, PoolConfig};

/// Benchmark: push 1000 8-byte elements into an array that grows in place.
fn bench_array_push_in_place(c: &mut Criterion) {
    let mut pool = Pool::create(PoolConfig::default()).unwrap();
    c.bench_function("array_push_in_place_1k", |b| {
        b.iter(|| {
            let mut array = Array::init(&mut pool, 4, 8).unwrap();
            for i in 0..1000u64 {
                array.push(&mut pool).unwrap().copy_from_slice(&i.to_le_bytes());
            }
            black_box(array.len());
            pool.reset();
        });
    });
}

/// Benchmark: push into an array whose buffer is always buried, forcing
/// doubling relocations.
fn bench_array_push_relocating(c: &mut Criterion) {
    let mut pool = Pool::create(PoolConfig::default()).unwrap();
    c.bench_function("array_push_relocating_1k", |b| {
        b.iter(|| {
            let mut array = Array::init(&mut pool, 1, 8).unwrap();
            for i in 0..1000u64 {
                array.push(&mut pool).unwrap().copy_from_slice(&i.to_le_bytes());
                if array.len() == array.capacity() {
                    black_box(pool.alloc(1).unwrap());
                }
            }
            black_box(array.len());
            pool.reset();
        });
    });
}

/// Benchmark: push 1000 elements into a list of 32-element parts, then
/// traverse it.
fn bench_list_push_iter(c: &mut Criterion) {
    let mut pool = Pool::create(PoolConfig::default()).unwrap();
    let part = NonZeroUsize::new(32).unwrap();
    c.bench_function("list_push_iter_1k", |b| {
        b.iter(|| {
            let mut list = List::init(&mut pool, part, 8).unwrap();
            for i in 0..1000u64 {
                list.push(&mut pool).unwrap().copy_from_slice(&i.to_le_bytes());
            }
            black_box(list.iter(&pool).unwrap().count());
            pool.reset();
        });
    });
}

criterion_group!(
    benches,
    bench_array_push_in_place,
    bench_array_push_relocating,
    bench_list_push_iter
);
criterion_main!(benches);
