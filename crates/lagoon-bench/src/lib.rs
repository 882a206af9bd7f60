//! Workload profiles shared by the Lagoon benchmarks and examples.
//!
//! - [`request_sizes`]: deterministic mix of request sizes for one unit of
//!   work, mostly small with occasional large allocations
//! - [`serve_request`]: run one such workload against a pool

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use lagoon_core::RawAllocator;
use lagoon_pool::{Pool, PoolError};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Probability (out of 64) that a request is above the pool threshold.
const LARGE_ODDS: u32 = 1;

/// Generate `count` request sizes from `seed`.
///
/// Small requests are spread over `1..=256` bytes; roughly one in 64 is a
/// large request between `large_floor` and `2 * large_floor`.
pub fn request_sizes(seed: u64, count: usize, large_floor: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            if rng.next_u32() % 64 < LARGE_ODDS {
                large_floor + (rng.next_u64() as usize % large_floor.max(1))
            } else {
                1 + (rng.next_u32() as usize % 256)
            }
        })
        .collect()
}

/// Allocate every size in `sizes`, touching the first byte of each, and
/// return the total bytes requested.
pub fn serve_request<A: RawAllocator>(
    pool: &mut Pool<A>,
    sizes: &[usize],
) -> Result<usize, PoolError> {
    let mut total = 0;
    for &size in sizes {
        let allocation = pool.alloc(size)?;
        if let Some(first) = pool.bytes_mut(&allocation)?.first_mut() {
            *first = 1;
        }
        total += size;
    }
    Ok(total)
}
