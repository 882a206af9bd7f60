//! Lagoon: region-based memory pools for per-unit-of-work allocation.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Lagoon sub-crates. For most users, adding `lagoon` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use lagoon::prelude::*;
//! use std::num::NonZeroUsize;
//!
//! let mut pool = Pool::create(PoolConfig::new(4096).with_name("request")).unwrap();
//!
//! // Small requests are bump-allocated from the block chain.
//! let greeting = pool.alloc_unaligned(5).unwrap();
//! pool.bytes_mut(&greeting).unwrap().copy_from_slice(b"hello");
//!
//! // Containers live in the pool too.
//! let mut ids = Array::create(&mut pool, 2, 4).unwrap();
//! for id in 1u32..=3 {
//!     ids.push(&mut pool).unwrap().copy_from_slice(&id.to_le_bytes());
//! }
//! assert_eq!(ids.len(), 3);
//!
//! let mut log = List::create(&mut pool, NonZeroUsize::new(2).unwrap(), 1).unwrap();
//! for byte in *b"abcde" {
//!     log.push(&mut pool).unwrap()[0] = byte;
//! }
//! assert_eq!(log.part_count(), 3);
//!
//! // Reset rewinds everything; old handles become stale.
//! pool.reset();
//! assert!(matches!(pool.bytes(&greeting), Err(PoolError::StaleAllocation { .. })));
//!
//! pool.destroy();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`raw`] | `lagoon-core` | Raw allocator trait, buffers, layout constants |
//! | [`pool`] | `lagoon-pool` | Pool, configuration, handles, cleanups |
//! | [`collections`] | `lagoon-collections` | Pool-backed `Array` and `List` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Raw memory interface (`lagoon-core`).
///
/// Implement [`raw::RawAllocator`] to back pools with something other than
/// the global heap.
pub use lagoon_core as raw;

/// Region pools (`lagoon-pool`).
///
/// [`pool::Pool`] plus its configuration, allocation handles and cleanup
/// actions.
pub use lagoon_pool as pool;

/// Pool-backed containers (`lagoon-collections`).
pub use lagoon_collections as collections;

/// Common imports for typical Lagoon usage.
///
/// ```rust
/// use lagoon::prelude::*;
/// ```
pub mod prelude {
    // Raw allocation
    pub use lagoon_core::{AllocError, RawAllocator, SystemAllocator};

    // Pool
    pub use lagoon_pool::{
        Allocation, CleanupAction, CleanupHandle, FreeStatus, Pool, PoolConfig, PoolError,
    };

    // Containers
    pub use lagoon_collections::{Array, List};
}
