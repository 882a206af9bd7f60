//! Alignment arithmetic and the fixed sizes of pool bookkeeping records.
//!
//! Pools never store their metadata inside block memory, but every record
//! still *reserves* the bytes it would occupy so that block capacity, the
//! small-allocation threshold and the "most recent allocation" checks all
//! behave exactly as if it did.

use std::mem;

const WORD: usize = mem::size_of::<usize>();

/// Alignment applied by aligned bump allocation (one machine word).
pub const ALIGNMENT: usize = WORD;

/// Alignment of every block's backing buffer.
pub const POOL_ALIGNMENT: usize = 16;

/// Page size assumed for the small-allocation ceiling.
pub const PAGE_SIZE: usize = 4096;

/// Largest request ever served by bump allocation, regardless of block size.
pub const MAX_ALLOC_FROM_POOL: usize = PAGE_SIZE - 1;

/// Default total size of a pool block.
pub const DEFAULT_POOL_SIZE: usize = 16 * 1024;

/// Header reserved at the front of every block after the first:
/// cursor, end, next link and failure counter.
pub const BLOCK_HEADER_SIZE: usize = 4 * WORD;

/// Header reserved at the front of the first block: the block header plus
/// threshold, current, chain, large head, cleanup head and log handle.
pub const POOL_HEADER_SIZE: usize = BLOCK_HEADER_SIZE + 6 * WORD;

/// Bump-allocated footprint of one large-allocation record.
pub const LARGE_RECORD_SIZE: usize = 2 * WORD;

/// Bump-allocated footprint of one cleanup record.
pub const CLEANUP_RECORD_SIZE: usize = 3 * WORD;

/// Bytes reserved for an array header created alongside its elements.
pub const ARRAY_HEADER_SIZE: usize = 5 * WORD;

/// Bytes reserved for a list header (with its embedded first part).
pub const LIST_HEADER_SIZE: usize = 7 * WORD;

/// Bytes reserved for each list part after the first.
pub const LIST_PART_HEADER_SIZE: usize = 3 * WORD;

/// Smallest accepted pool size: the pool header plus two large records,
/// rounded to [`POOL_ALIGNMENT`].
pub const MIN_POOL_SIZE: usize = align_up(POOL_HEADER_SIZE + 2 * LARGE_RECORD_SIZE, POOL_ALIGNMENT);

/// Round `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. Overflows wrap in release builds; use
/// [`checked_align_up`] for untrusted input.
#[must_use]
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Round `value` up to the next multiple of `align`, or `None` on overflow.
#[must_use]
pub const fn checked_align_up(value: usize, align: usize) -> Option<usize> {
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Whether `value` is a multiple of `align`.
#[must_use]
pub const fn is_aligned(value: usize, align: usize) -> bool {
    value & (align - 1) == 0
}
