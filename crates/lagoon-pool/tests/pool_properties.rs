//! Property tests: alignment and disjointness of pool allocations.

use lagoon_core::layout::ALIGNMENT;
use lagoon_pool::{Pool, PoolConfig};
use proptest::prelude::*;

fn request() -> impl Strategy<Value = (usize, bool)> {
    (0usize..6000, any::<bool>())
}

proptest! {
    #[test]
    fn aligned_allocations_are_word_aligned(
        sizes in prop::collection::vec(0usize..5000, 1..64),
    ) {
        let mut pool = Pool::create(PoolConfig::new(4096)).unwrap();
        for size in sizes {
            let a = pool.alloc(size).unwrap();
            prop_assert_eq!(pool.address(&a).unwrap() % ALIGNMENT, 0);
        }
    }

    #[test]
    fn live_allocations_never_overlap(
        requests in prop::collection::vec(request(), 1..96),
    ) {
        let mut pool = Pool::create(PoolConfig::new(1024)).unwrap();
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for (size, aligned) in requests {
            let a = if aligned {
                pool.alloc(size).unwrap()
            } else {
                pool.alloc_unaligned(size).unwrap()
            };
            prop_assert_eq!(a.len(), size);
            if size == 0 {
                continue;
            }
            let start = pool.address(&a).unwrap();
            let end = start + size;
            for &(s, e) in &ranges {
                prop_assert!(end <= s || start >= e, "[{start}, {end}) overlaps [{s}, {e})");
            }
            ranges.push((start, end));
        }
    }

    #[test]
    fn writes_survive_later_allocations(
        sizes in prop::collection::vec(1usize..600, 1..48),
    ) {
        let mut pool = Pool::create(PoolConfig::new(2048)).unwrap();
        let mut written = Vec::new();
        for (i, size) in sizes.into_iter().enumerate() {
            let a = pool.alloc(size).unwrap();
            pool.bytes_mut(&a).unwrap().fill(i as u8);
            written.push((a, i as u8));
        }
        for (a, tag) in &written {
            prop_assert!(pool.bytes(a).unwrap().iter().all(|b| b == tag));
        }
    }
}
