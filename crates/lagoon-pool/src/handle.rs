//! Allocation handles and location descriptors.
//!
//! An [`Allocation`] encodes where a pool allocation lives. It is
//! generation-scoped: the pool bumps its generation on every `reset()`, so a
//! handle from before the reset is detected in O(1) instead of silently
//! aliasing memory that has since been handed out again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lagoon_core::RawId;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Location and extent of one pool allocation.
///
/// Handles are plain values: copying one does not duplicate the memory, and
/// dropping one frees nothing. Resolve them with
/// [`Pool::bytes`](crate::Pool::bytes) / [`Pool::bytes_mut`](crate::Pool::bytes_mut).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    pub(crate) pool: PoolId,
    pub(crate) generation: u32,
    pub(crate) len: usize,
    pub(crate) location: Location,
}

impl Allocation {
    pub(crate) fn new(pool: PoolId, generation: u32, len: usize, location: Location) -> Self {
        Self {
            pool,
            generation,
            len,
            location,
        }
    }

    /// Length of the allocation in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The pool generation this handle belongs to.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The pool this handle was issued by.
    pub fn pool(&self) -> PoolId {
        self.pool
    }

    /// The location descriptor.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Whether the allocation was served outside the block chain.
    pub fn is_large(&self) -> bool {
        matches!(self.location, Location::Large { .. })
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Location::Block { index, offset } => write!(
                f,
                "{}[gen={}, block={index}, off={offset}, len={}]",
                self.pool, self.generation, self.len
            ),
            Location::Large { id } => write!(
                f,
                "{}[gen={}, {id}, len={}]",
                self.pool, self.generation, self.len
            ),
        }
    }
}

/// Where an [`Allocation`] lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    /// Bump-allocated inside the block chain.
    Block {
        /// Position of the block in the chain.
        index: usize,
        /// Byte offset from the start of the block buffer.
        offset: usize,
    },
    /// A dedicated raw buffer tracked in the large-allocation slots.
    Large {
        /// Identity of the backing buffer.
        id: RawId,
    },
}

/// Result of [`Pool::free`](crate::Pool::free).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum FreeStatus {
    /// The backing buffer was released and its slot is now reusable.
    Freed,
    /// The pool does not track this allocation; nothing was changed.
    NotFound,
}

/// Handle to a registered cleanup record.
///
/// Returned by [`Pool::add_cleanup`](crate::Pool::add_cleanup). The action is
/// attached with [`Pool::set_cleanup`](crate::Pool::set_cleanup) and can be
/// withdrawn with [`Pool::disable_cleanup`](crate::Pool::disable_cleanup).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CleanupHandle {
    pub(crate) pool: PoolId,
    pub(crate) index: usize,
    pub(crate) data: Option<Allocation>,
}

impl CleanupHandle {
    /// Position of the record in registration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Caller data reserved alongside the record, if any was requested.
    pub fn data(&self) -> Option<Allocation> {
        self.data
    }
}
