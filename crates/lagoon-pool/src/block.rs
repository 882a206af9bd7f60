//! Fixed-size blocks and bump allocation within them.
//!
//! A [`Block`] is one raw buffer with a data region `[start, end)` and a
//! cursor `last` that only moves forward between resets. The first block of
//! a pool reserves the larger pool header before its data region; later
//! blocks reserve only the block header.

use lagoon_core::layout::ALIGNMENT;
use lagoon_core::{align_up, checked_align_up, RawBuffer};

/// One link of a pool's block chain.
pub(crate) struct Block {
    buffer: RawBuffer,
    /// First byte of the data region.
    start: usize,
    /// Next free byte.
    last: usize,
    /// Times this block was passed over while growing the chain.
    failed: u32,
}

impl Block {
    /// Wrap `buffer` with the data region beginning after `header` bytes.
    pub(crate) fn new(buffer: RawBuffer, header: usize) -> Self {
        let start = align_up(header, ALIGNMENT);
        debug_assert!(start <= buffer.len());
        Self {
            buffer,
            start,
            last: start,
            failed: 0,
        }
    }

    /// Try to claim `size` bytes, rounding the cursor to [`ALIGNMENT`] first
    /// when `aligned` is set. Returns the offset of the claimed region.
    ///
    /// A failed attempt leaves the cursor untouched.
    pub(crate) fn try_bump(&mut self, size: usize, aligned: bool) -> Option<usize> {
        let offset = if aligned {
            checked_align_up(self.last, ALIGNMENT)?
        } else {
            self.last
        };
        if self.end().checked_sub(offset)? >= size {
            self.last = offset + size;
            Some(offset)
        } else {
            None
        }
    }

    /// Extend the region ending at the cursor by `additional` bytes.
    ///
    /// Succeeds only if `region_end` is the cursor (the region is the most
    /// recent claim in this block) and the block has room.
    pub(crate) fn try_extend(&mut self, region_end: usize, additional: usize) -> bool {
        if region_end == self.last && self.end() - self.last >= additional {
            self.last += additional;
            true
        } else {
            false
        }
    }

    /// Give back `[offset, region_end)` if it is the most recent claim.
    pub(crate) fn try_reclaim(&mut self, offset: usize, region_end: usize) -> bool {
        if region_end == self.last {
            self.last = offset;
            true
        } else {
            false
        }
    }

    /// Move the cursor back to the start of the data region.
    pub(crate) fn reset(&mut self) {
        self.last = self.start;
        self.failed = 0;
    }

    /// Record one more pass-over; returns the count *before* this one.
    pub(crate) fn note_failure(&mut self) -> u32 {
        let previous = self.failed;
        self.failed = self.failed.saturating_add(1);
        previous
    }

    pub(crate) fn end(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.last
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut_slice()
    }

    pub(crate) fn addr(&self) -> usize {
        self.buffer.addr()
    }

    pub(crate) fn into_buffer(self) -> RawBuffer {
        self.buffer
    }

    pub(crate) fn stats(&self) -> BlockStats {
        BlockStats {
            size: self.end(),
            capacity: self.end() - self.start,
            used: self.last - self.start,
            unused: self.end() - self.last,
            failed: self.failed,
        }
    }
}

/// Occupancy of one block, as reported by [`Pool::block_stats`](crate::Pool::block_stats).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockStats {
    /// Total block size, header included.
    pub size: usize,
    /// Size of the data region.
    pub capacity: usize,
    /// Bytes claimed from the data region, alignment padding included.
    pub used: usize,
    /// Bytes still available after the cursor.
    pub unused: usize,
    /// Growth passes that found this block without room.
    pub failed: u32,
}
