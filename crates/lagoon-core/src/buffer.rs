//! Owned, aligned heap regions.
//!
//! A [`RawBuffer`] is the unit every [`RawAllocator`](crate::RawAllocator)
//! hands out: one heap allocation with a recorded layout, exposed to the
//! rest of Lagoon only as a byte slice. Pools compute alignment on offsets
//! into these slices; the buffer's own base alignment is what makes those
//! offsets translate into aligned addresses.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AllocError;

static NEXT_RAW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`RawBuffer`].
///
/// Ids are never reused, so a stale id can never match a newer buffer that
/// happens to land at the same address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawId(u64);

impl RawId {
    fn next() -> Self {
        Self(NEXT_RAW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric value of this id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "raw#{}", self.0)
    }
}

/// An owned heap region of `len` bytes aligned to `align`.
///
/// The memory is released when the buffer is dropped. Zero-length buffers
/// still own a one-byte allocation so that every buffer has a distinct,
/// aligned address.
pub struct RawBuffer {
    id: RawId,
    ptr: NonNull<u8>,
    layout: Layout,
    len: usize,
}

// SAFETY: a RawBuffer uniquely owns its allocation and hands out access only
// through `&self`/`&mut self`, exactly like `Box<[u8]>`.
unsafe impl Send for RawBuffer {}
// SAFETY: shared access only yields `&[u8]`.
unsafe impl Sync for RawBuffer {}

impl RawBuffer {
    /// Allocate `size` bytes aligned to `align`.
    ///
    /// The memory comes back zero-filled so that exposing it as `&[u8]` never
    /// reads uninitialised bytes. Callers that *require* zeroes should still
    /// go through [`RawAllocator::allocate_zeroed`](crate::RawAllocator::allocate_zeroed),
    /// which does not depend on this detail.
    pub fn new(size: usize, align: usize) -> Result<Self, AllocError> {
        let layout = Layout::from_size_align(size.max(1), align)
            .map_err(|_| AllocError::InvalidLayout { size, align })?;

        // SAFETY: `layout` has a non-zero size (clamped to at least one byte).
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(AllocError::OutOfMemory { size, align })?;

        Ok(Self {
            id: RawId::next(),
            ptr,
            layout,
            len: size,
        })
    }

    /// Identity of this buffer.
    pub fn id(&self) -> RawId {
        self.id
    }

    /// Usable length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has zero usable bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment of the buffer's base address.
    pub fn align(&self) -> usize {
        self.layout.align()
    }

    /// Base address of the buffer, for diagnostics and alignment checks.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// The buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialised bytes (the allocation
        // is zero-filled and at least `len` bytes) for the lifetime of `self`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The buffer contents, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with exactly `layout`
        // and has not been freed; RawBuffer is not Clone.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("id", &self.id)
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len)
            .field("align", &self.layout.align())
            .finish()
    }
}
