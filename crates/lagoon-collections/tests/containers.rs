//! Integration test: arrays and lists against the pool's block chain.

use std::num::NonZeroUsize;

use lagoon_collections::{Array, List};
use lagoon_core::layout::ARRAY_HEADER_SIZE;
use lagoon_pool::{Pool, PoolConfig, PoolError};
use lagoon_test_utils::{pattern, CountingAllocator};
use proptest::prelude::*;

fn pool() -> Pool {
    Pool::create(PoolConfig::new(4096)).unwrap()
}

// ── Array growth ─────────────────────────────────────────────────────

#[test]
fn third_push_extends_most_recent_buffer() {
    let mut pool = pool();
    let mut array = Array::create(&mut pool, 2, 4).unwrap();
    for i in 0..3 {
        array.push(&mut pool).unwrap().copy_from_slice(&pattern(i, 4));
    }
    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 3);
    for i in 0..3 {
        assert_eq!(array.get(&pool, i).unwrap().unwrap(), pattern(i, 4).as_slice());
    }
}

#[test]
fn third_push_copies_when_buffer_is_buried() {
    let mut pool = pool();
    let mut array = Array::create(&mut pool, 2, 4).unwrap();
    for i in 0..2 {
        array.push(&mut pool).unwrap().copy_from_slice(&pattern(i, 4));
    }
    let before = pool.block_stats()[0].used;
    pool.alloc(1).unwrap();
    array.push(&mut pool).unwrap().copy_from_slice(&pattern(2, 4));

    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 4);
    // The abandoned buffer stays behind; the new one is allocated after it.
    assert!(pool.block_stats()[0].used >= before + 16);
    let elements: Vec<&[u8]> = array.iter(&pool).unwrap().collect();
    for (i, element) in elements.into_iter().enumerate() {
        assert_eq!(element, pattern(i, 4).as_slice());
    }
}

#[test]
fn growth_across_blocks_preserves_contents() {
    let mut pool = Pool::create(PoolConfig::new(1024)).unwrap();
    let mut array = Array::init(&mut pool, 1, 16).unwrap();
    for i in 0..40 {
        array.push(&mut pool).unwrap().copy_from_slice(&pattern(i, 16));
        pool.alloc(8).unwrap();
    }
    assert!(pool.block_count() > 1);
    for i in 0..40 {
        assert_eq!(array.get(&pool, i).unwrap().unwrap(), pattern(i, 16).as_slice());
    }
}

#[test]
fn growth_past_threshold_moves_to_large_buffer() {
    let mut pool = Pool::create(PoolConfig::new(1024)).unwrap();
    let max = pool.max();
    let mut array = Array::init(&mut pool, 1, max / 2 + 1).unwrap();
    array.push(&mut pool).unwrap().fill(1);
    pool.alloc(8).unwrap();
    array.push(&mut pool).unwrap().fill(2);
    assert_eq!(pool.large_live(), 1);
    assert!(array.get(&pool, 0).unwrap().unwrap().iter().all(|&b| b == 1));
    assert!(array.get(&pool, 1).unwrap().unwrap().iter().all(|&b| b == 2));
}

// ── Array destroy ────────────────────────────────────────────────────

#[test]
fn destroy_reclaims_buffer_and_header() {
    let mut pool = pool();
    let used = pool.block_stats()[0].used;
    let array = Array::create(&mut pool, 4, 8).unwrap();
    assert_eq!(array.destroy(&mut pool), 32 + ARRAY_HEADER_SIZE);
    assert_eq!(pool.block_stats()[0].used, used);
}

#[test]
fn destroy_of_buried_array_is_noop() {
    let mut pool = pool();
    let array = Array::create(&mut pool, 4, 8).unwrap();
    pool.alloc(8).unwrap();
    let used = pool.block_stats()[0].used;
    assert_eq!(array.destroy(&mut pool), 0);
    assert_eq!(pool.block_stats()[0].used, used);
}

#[test]
fn destroy_after_relocation_reclaims_only_buffer() {
    let mut pool = pool();
    let mut array = Array::create(&mut pool, 1, 8).unwrap();
    array.push(&mut pool).unwrap();
    pool.alloc(8).unwrap();
    array.push(&mut pool).unwrap();
    // The new buffer is last; the header is buried behind the filler.
    assert_eq!(array.destroy(&mut pool), 16);
}

#[test]
fn stale_array_reports_generation() {
    let mut pool = pool();
    let mut array = Array::create(&mut pool, 1, 4).unwrap();
    pool.reset();
    assert!(matches!(
        array.push(&mut pool),
        Err(PoolError::StaleAllocation { .. })
    ));
    assert!(matches!(
        array.as_bytes(&pool),
        Err(PoolError::StaleAllocation { .. })
    ));
    assert_eq!(array.destroy(&mut pool), 0);
}

// ── List ─────────────────────────────────────────────────────────────

#[test]
fn five_pushes_make_three_parts() {
    let mut pool = pool();
    let mut list = List::create(&mut pool, NonZeroUsize::new(2).unwrap(), 4).unwrap();
    for i in 0..5 {
        list.push(&mut pool).unwrap().copy_from_slice(&pattern(i, 4));
    }
    let counts: Vec<usize> = list.parts(&pool).unwrap().map(|p| p.len()).collect();
    assert_eq!(counts, vec![2, 2, 1]);
    assert_eq!(list.len(), 5);
    for (i, element) in list.iter(&pool).unwrap().enumerate() {
        assert_eq!(element, pattern(i, 4).as_slice());
    }
}

#[test]
fn list_memory_returns_with_pool() {
    let alloc = CountingAllocator::new();
    {
        let mut pool = Pool::with_allocator(PoolConfig::new(1024), alloc.clone()).unwrap();
        let mut list = List::init(&mut pool, NonZeroUsize::new(8).unwrap(), 32).unwrap();
        for _ in 0..200 {
            list.push(&mut pool).unwrap();
        }
        assert!(alloc.live() > 1);
        assert_eq!(list.part_count(), 25);
    }
    assert_eq!(alloc.live(), 0);
}

// ── Model checks ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn array_matches_vec_model(
        ops in prop::collection::vec((1usize..5, any::<bool>()), 1..64),
        element_size in 1usize..24,
    ) {
        let mut pool = Pool::create(PoolConfig::new(2048)).unwrap();
        let mut array = Array::init(&mut pool, 2, element_size).unwrap();
        let mut model: Vec<Vec<u8>> = Vec::new();
        for (n, bury) in ops {
            if bury {
                pool.alloc(3).unwrap();
            }
            let base = model.len();
            let slots = array.push_n(&mut pool, n).unwrap();
            for (k, slot) in slots.chunks_mut(element_size).enumerate() {
                slot.copy_from_slice(&pattern(base + k, element_size));
            }
            model.extend((base..base + n).map(|i| pattern(i, element_size)));
            prop_assert!(array.len() <= array.capacity());
        }
        prop_assert_eq!(array.len(), model.len());
        for (element, expected) in array.iter(&pool).unwrap().zip(&model) {
            prop_assert_eq!(element, expected.as_slice());
        }
    }

    #[test]
    fn list_parts_are_full_except_last(
        pushes in 0usize..100,
        part_capacity in 1usize..9,
    ) {
        let mut pool = Pool::create(PoolConfig::new(2048)).unwrap();
        let capacity = NonZeroUsize::new(part_capacity).unwrap();
        let mut list = List::init(&mut pool, capacity, 2).unwrap();
        for _ in 0..pushes {
            list.push(&mut pool).unwrap();
        }
        let parts: Vec<_> = list.parts(&pool).unwrap().collect();
        let (last, full) = parts.split_last().unwrap();
        prop_assert!(full.iter().all(|p| p.len() == part_capacity));
        prop_assert!(last.len() <= part_capacity);
        prop_assert_eq!(list.len(), pushes);
    }
}
