//! Pool-specific error types.

use lagoon_core::AllocError;

/// Errors that can occur during pool operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The raw allocator could not satisfy a block, large or aligned request.
    #[error(transparent)]
    Alloc(#[from] AllocError),
    /// The pool configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Requested alignment is not a power of two.
    #[error("alignment {align} is not a power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// A size computation (`count * element_size`, doubling) overflowed.
    #[error("allocation size overflow")]
    SizeOverflow,
    /// An allocation made before the last `reset()`.
    #[error("stale allocation: generation {handle_generation}, pool generation {pool_generation}")]
    StaleAllocation {
        /// The generation encoded in the handle.
        handle_generation: u32,
        /// The pool's current generation.
        pool_generation: u32,
    },
    /// An allocation that belongs to a different pool.
    #[error("allocation belongs to a different pool")]
    ForeignAllocation,
    /// A large allocation that has already been freed.
    #[error("large allocation is no longer tracked by the pool")]
    UnknownAllocation,
    /// A cleanup handle that does not refer to a record in this pool.
    #[error("unknown cleanup record {index}")]
    UnknownCleanup {
        /// The handle's record index.
        index: usize,
    },
}

/// Reasons a [`PoolConfig`](crate::PoolConfig) is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The block size cannot hold the pool header and its first records.
    #[error("pool size {size} is below the minimum of {min} bytes")]
    SizeTooSmall {
        /// Configured size.
        size: usize,
        /// Minimum accepted size.
        min: usize,
    },
    /// The threshold ceiling cannot hold the pool's own records.
    #[error("max_alloc {max_alloc} is below the minimum of {min} bytes")]
    MaxAllocTooSmall {
        /// Configured ceiling.
        max_alloc: usize,
        /// Minimum accepted ceiling.
        min: usize,
    },
}
