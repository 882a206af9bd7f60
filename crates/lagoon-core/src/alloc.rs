//! The raw allocator interface consumed by pools.
//!
//! A pool never touches the global heap directly. Block buffers, large
//! allocations and over-aligned allocations all come from a
//! [`RawAllocator`], and go back to it through [`RawAllocator::free`].

use tracing::{error, trace};

use crate::buffer::RawBuffer;
use crate::error::AllocError;
use crate::layout::ALIGNMENT;

/// Source of raw heap memory for a pool.
///
/// Implementations report failure by returning [`AllocError`]; they never
/// panic on exhaustion. Diagnostics go to `tracing`.
pub trait RawAllocator {
    /// Allocate `size` bytes with at least word alignment (`malloc`).
    fn allocate(&self, size: usize) -> Result<RawBuffer, AllocError> {
        self.allocate_aligned(ALIGNMENT, size)
    }

    /// Allocate `size` bytes aligned to `align` (`posix_memalign`).
    fn allocate_aligned(&self, align: usize, size: usize) -> Result<RawBuffer, AllocError>;

    /// Allocate `size` zero-filled bytes (`calloc`).
    fn allocate_zeroed(&self, size: usize) -> Result<RawBuffer, AllocError> {
        let mut buffer = self.allocate(size)?;
        buffer.as_mut_slice().fill(0);
        Ok(buffer)
    }

    /// Return a buffer obtained from this allocator.
    fn free(&self, buffer: RawBuffer) {
        drop(buffer);
    }
}

impl<A: RawAllocator + ?Sized> RawAllocator for Box<A> {
    fn allocate(&self, size: usize) -> Result<RawBuffer, AllocError> {
        (**self).allocate(size)
    }

    fn allocate_aligned(&self, align: usize, size: usize) -> Result<RawBuffer, AllocError> {
        (**self).allocate_aligned(align, size)
    }

    fn allocate_zeroed(&self, size: usize) -> Result<RawBuffer, AllocError> {
        (**self).allocate_zeroed(size)
    }

    fn free(&self, buffer: RawBuffer) {
        (**self).free(buffer);
    }
}

/// [`RawAllocator`] backed by the global Rust heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    fn log_result(
        op: &'static str,
        align: usize,
        size: usize,
        result: Result<RawBuffer, AllocError>,
    ) -> Result<RawBuffer, AllocError> {
        match &result {
            Ok(buffer) => trace!(op, id = %buffer.id(), addr = buffer.addr(), size, align, "raw allocate"),
            Err(err) => error!(op, size, align, %err, "raw allocation failed"),
        }
        result
    }
}

impl RawAllocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Result<RawBuffer, AllocError> {
        Self::log_result("malloc", ALIGNMENT, size, RawBuffer::new(size, ALIGNMENT))
    }

    fn allocate_aligned(&self, align: usize, size: usize) -> Result<RawBuffer, AllocError> {
        Self::log_result("memalign", align, size, RawBuffer::new(size, align))
    }

    fn allocate_zeroed(&self, size: usize) -> Result<RawBuffer, AllocError> {
        // Fresh RawBuffers are already zero-filled.
        Self::log_result("calloc", ALIGNMENT, size, RawBuffer::new(size, ALIGNMENT))
    }

    fn free(&self, buffer: RawBuffer) {
        trace!(id = %buffer.id(), addr = buffer.addr(), size = buffer.len(), "raw free");
        drop(buffer);
    }
}
