//! Pool configuration parameters.

use lagoon_core::layout::{
    CLEANUP_RECORD_SIZE, DEFAULT_POOL_SIZE, LARGE_RECORD_SIZE, MAX_ALLOC_FROM_POOL, MIN_POOL_SIZE,
    POOL_HEADER_SIZE,
};

use crate::error::ConfigError;

/// Configuration for a [`Pool`](crate::Pool).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Total size of every block in bytes, headers included.
    ///
    /// Default: [`DEFAULT_POOL_SIZE`] (16 KiB). Must be at least
    /// [`MIN_POOL_SIZE`].
    pub size: usize,

    /// Ceiling on the small-allocation threshold.
    ///
    /// The pool's effective threshold is
    /// `min(size - POOL_HEADER_SIZE, max_alloc)`; requests above it bypass
    /// the block chain. Default: [`MAX_ALLOC_FROM_POOL`] (page size - 1).
    pub max_alloc: usize,

    /// Label attached to every log event emitted by the pool.
    pub name: Option<String>,
}

impl PoolConfig {
    /// Smallest accepted `max_alloc`: every bookkeeping record must fit
    /// under the threshold.
    pub const MIN_MAX_ALLOC: usize = if CLEANUP_RECORD_SIZE > LARGE_RECORD_SIZE {
        CLEANUP_RECORD_SIZE
    } else {
        LARGE_RECORD_SIZE
    };

    /// Create a config with the given block size and default ceiling.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            max_alloc: MAX_ALLOC_FROM_POOL,
            name: None,
        }
    }

    /// Attach a log label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the small-allocation ceiling.
    #[must_use]
    pub fn with_max_alloc(mut self, max_alloc: usize) -> Self {
        self.max_alloc = max_alloc;
        self
    }

    /// Check the config for values the pool cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < MIN_POOL_SIZE {
            return Err(ConfigError::SizeTooSmall {
                size: self.size,
                min: MIN_POOL_SIZE,
            });
        }
        if self.max_alloc < Self::MIN_MAX_ALLOC {
            return Err(ConfigError::MaxAllocTooSmall {
                max_alloc: self.max_alloc,
                min: Self::MIN_MAX_ALLOC,
            });
        }
        Ok(())
    }

    /// The small-allocation threshold a pool built from this config uses.
    pub fn threshold(&self) -> usize {
        self.size.saturating_sub(POOL_HEADER_SIZE).min(self.max_alloc)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
