//! Test allocators and helpers for Lagoon development.
//!
//! Provides [`RawAllocator`] wrappers that observe or sabotage the raw
//! memory traffic of a pool:
//!
//! - [`CountingAllocator`] records every live buffer, so tests can assert
//!   that reset/destroy return exactly what they should.
//! - [`FailingAllocator`] succeeds a fixed number of times and then fails,
//!   for exercising allocation-failure paths.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use lagoon_core::{AllocError, RawAllocator, RawBuffer, RawId, SystemAllocator};

#[derive(Debug, Default)]
struct Ledger {
    /// Live buffers in allocation order, with their sizes.
    live: RefCell<IndexMap<RawId, usize>>,
    allocations: Cell<usize>,
    frees: Cell<usize>,
}

/// Allocator that tracks every buffer it hands out.
///
/// Clones share the same ledger, so a test can keep one clone while the
/// pool owns the other.
#[derive(Clone, Debug, Default)]
pub struct CountingAllocator {
    ledger: Rc<Ledger>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers allocated and not yet freed.
    pub fn live(&self) -> usize {
        self.ledger.live.borrow().len()
    }

    /// Total bytes held by live buffers.
    pub fn live_bytes(&self) -> usize {
        self.ledger.live.borrow().values().sum()
    }

    /// Sizes of live buffers in allocation order.
    pub fn live_sizes(&self) -> Vec<usize> {
        self.ledger.live.borrow().values().copied().collect()
    }

    /// Whether buffer `id` is still live.
    pub fn is_live(&self, id: RawId) -> bool {
        self.ledger.live.borrow().contains_key(&id)
    }

    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.ledger.allocations.get()
    }

    /// Frees so far.
    pub fn frees(&self) -> usize {
        self.ledger.frees.get()
    }

    fn record(&self, result: Result<RawBuffer, AllocError>) -> Result<RawBuffer, AllocError> {
        if let Ok(buffer) = &result {
            self.ledger.live.borrow_mut().insert(buffer.id(), buffer.len());
            self.ledger.allocations.set(self.ledger.allocations.get() + 1);
        }
        result
    }
}

impl RawAllocator for CountingAllocator {
    fn allocate(&self, size: usize) -> Result<RawBuffer, AllocError> {
        self.record(SystemAllocator.allocate(size))
    }

    fn allocate_aligned(&self, align: usize, size: usize) -> Result<RawBuffer, AllocError> {
        self.record(SystemAllocator.allocate_aligned(align, size))
    }

    fn free(&self, buffer: RawBuffer) {
        let removed = self.ledger.live.borrow_mut().shift_remove(&buffer.id());
        assert!(removed.is_some(), "free of untracked buffer {}", buffer.id());
        self.ledger.frees.set(self.ledger.frees.get() + 1);
        SystemAllocator.free(buffer);
    }
}

/// Allocator that succeeds `budget` times and fails every request after.
#[derive(Clone, Debug)]
pub struct FailingAllocator {
    remaining: Rc<Cell<usize>>,
    inner: CountingAllocator,
}

impl FailingAllocator {
    pub fn new(budget: usize) -> Self {
        Self {
            remaining: Rc::new(Cell::new(budget)),
            inner: CountingAllocator::new(),
        }
    }

    /// Allow `n` more successful allocations.
    pub fn refill(&self, n: usize) {
        self.remaining.set(n);
    }

    /// The underlying ledger.
    pub fn counter(&self) -> &CountingAllocator {
        &self.inner
    }

    fn take(&self, size: usize, align: usize) -> Result<(), AllocError> {
        match self.remaining.get() {
            0 => Err(AllocError::OutOfMemory { size, align }),
            n => {
                self.remaining.set(n - 1);
                Ok(())
            }
        }
    }
}

impl RawAllocator for FailingAllocator {
    fn allocate(&self, size: usize) -> Result<RawBuffer, AllocError> {
        self.take(size, lagoon_core::layout::ALIGNMENT)?;
        self.inner.allocate(size)
    }

    fn allocate_aligned(&self, align: usize, size: usize) -> Result<RawBuffer, AllocError> {
        self.take(size, align)?;
        self.inner.allocate_aligned(align, size)
    }

    fn free(&self, buffer: RawBuffer) {
        self.inner.free(buffer);
    }
}

/// Deterministic byte pattern for element `index`, for verifying copies.
pub fn pattern(index: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| (index.wrapping_mul(31) ^ i) as u8).collect()
}
