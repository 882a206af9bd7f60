//! Region-based memory pool for Lagoon.
//!
//! A [`Pool`] hands out memory from a chain of fixed-size blocks with O(1)
//! amortised bump allocation and releases it all at once. Requests above
//! the pool's threshold are served by the raw allocator and tracked so they
//! can be freed early; release actions for external resources can be
//! attached to the pool and run, most recent first, when it is destroyed.
//!
//! # Example
//!
//! ```rust
//! use lagoon_pool::{Pool, PoolConfig, FreeStatus};
//!
//! let mut pool = Pool::create(PoolConfig::new(4096)).unwrap();
//!
//! let small = pool.alloc(64).unwrap();
//! pool.bytes_mut(&small).unwrap().fill(7);
//!
//! let big = pool.alloc(pool.max() + 1).unwrap();
//! assert!(big.is_large());
//! assert_eq!(pool.free(&big), FreeStatus::Freed);
//!
//! pool.on_destroy(|| println!("released")).unwrap();
//! pool.destroy();
//! ```
//!
//! # Allocation paths
//!
//! - **Small** (`size <= max`): search the block chain from the current
//!   block, growing it by one block of the original size when nothing fits.
//! - **Large** (`size > max`): raw-allocate and record in a bounded-scan
//!   reusable slot.
//! - **Over-aligned** ([`Pool::alloc_aligned_to`]): always raw-allocated.
//!
//! Handles carry the pool generation; [`Pool::reset`] invalidates them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod cleanup;
pub mod config;
pub mod error;
#[cfg(unix)]
pub mod file;
pub mod handle;
mod large;
pub mod pool;

// Public re-exports for the primary API surface.
pub use block::BlockStats;
pub use cleanup::CleanupAction;
pub use config::PoolConfig;
pub use error::{ConfigError, PoolError};
#[cfg(unix)]
pub use file::FileCleanup;
pub use handle::{Allocation, CleanupHandle, FreeStatus, Location, PoolId};
pub use pool::{Pool, FAILURE_THRESHOLD};
