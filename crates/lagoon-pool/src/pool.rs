//! The region pool: block chain, large allocations and cleanup chain.
//!
//! [`Pool`] is the top-level allocator. Small requests are bump-allocated
//! from a chain of equally sized blocks; requests above the pool's threshold
//! go straight to the raw allocator and are tracked so they can be freed
//! individually. Nothing else is ever freed individually: [`Pool::reset`]
//! rewinds every block, and [`Pool::destroy`] (or dropping the pool) runs the
//! cleanup chain and returns all memory.
//!
//! ```text
//! Pool
//! ├── blocks: Block[]   ←── first block reserves POOL_HEADER_SIZE,
//! │                         later ones BLOCK_HEADER_SIZE
//! ├── current           ←── where small-allocation search starts
//! ├── large: LargeSlots ←── raw buffers above the threshold
//! └── cleanup           ←── LIFO release actions, run at destroy
//! ```

use lagoon_core::layout::{
    BLOCK_HEADER_SIZE, CLEANUP_RECORD_SIZE, LARGE_RECORD_SIZE, POOL_ALIGNMENT, POOL_HEADER_SIZE,
};
use lagoon_core::{RawAllocator, RawBuffer, SystemAllocator};
use tracing::{debug, trace};

use crate::block::{Block, BlockStats};
use crate::cleanup::{CleanupAction, CleanupChain};
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::handle::{Allocation, CleanupHandle, FreeStatus, Location, PoolId};
use crate::large::LargeSlots;

/// A block that has been passed over more than this many times while
/// growing the chain is excluded from the search start.
pub const FAILURE_THRESHOLD: u32 = 4;

/// Where a resolved allocation's bytes live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Span {
    Block(usize),
    Large(usize),
}

/// Region-based allocator over a chain of fixed-size blocks.
///
/// Single-owner: a pool and every handle it issues are meant to be used by
/// one logical owner at a time (typically one pool per unit of work).
pub struct Pool<A: RawAllocator = SystemAllocator> {
    id: PoolId,
    /// Incremented by `reset()`; handles from older generations are stale.
    generation: u32,
    blocks: Vec<Block>,
    /// Total size of every block.
    block_size: usize,
    /// Largest request served from the block chain.
    max: usize,
    /// Index of the block where small-allocation search begins.
    current: usize,
    large: LargeSlots,
    cleanup: CleanupChain,
    allocator: A,
    name: Option<String>,
}

impl Pool<SystemAllocator> {
    /// Create a pool on the global heap.
    pub fn create(config: PoolConfig) -> Result<Self, PoolError> {
        Self::with_allocator(config, SystemAllocator)
    }
}

impl<A: RawAllocator> Pool<A> {
    /// Create a pool whose memory comes from `allocator`.
    ///
    /// Allocates the first block immediately; fails if that raw allocation
    /// fails.
    pub fn with_allocator(config: PoolConfig, allocator: A) -> Result<Self, PoolError> {
        config.validate()?;
        let buffer = allocator.allocate_aligned(POOL_ALIGNMENT, config.size)?;
        let pool = Self {
            id: PoolId::next(),
            generation: 0,
            blocks: vec![Block::new(buffer, POOL_HEADER_SIZE)],
            block_size: config.size,
            max: config.threshold(),
            current: 0,
            large: LargeSlots::default(),
            cleanup: CleanupChain::default(),
            allocator,
            name: config.name,
        };
        debug!(pool = pool.label(), id = %pool.id, size = pool.block_size, max = pool.max, "create pool");
        Ok(pool)
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    // ── Allocation paths ─────────────────────────────────────────

    /// Allocate `size` bytes aligned to [`ALIGNMENT`](lagoon_core::layout::ALIGNMENT).
    ///
    /// Requests up to [`Pool::max`] are bump-allocated from the block chain
    /// (growing it if needed); larger ones become tracked large allocations.
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, PoolError> {
        if size <= self.max {
            self.alloc_small(size, true)
        } else {
            self.alloc_large(size)
        }
    }

    /// Like [`Pool::alloc`] but without rounding the block cursor, so
    /// consecutive small requests pack with no padding. For byte data where
    /// alignment is irrelevant.
    pub fn alloc_unaligned(&mut self, size: usize) -> Result<Allocation, PoolError> {
        if size <= self.max {
            self.alloc_small(size, false)
        } else {
            self.alloc_large(size)
        }
    }

    /// Like [`Pool::alloc`], with the returned region zero-filled.
    pub fn alloc_zeroed(&mut self, size: usize) -> Result<Allocation, PoolError> {
        let allocation = self.alloc(size)?;
        self.bytes_mut(&allocation)?.fill(0);
        Ok(allocation)
    }

    /// Allocate `size` bytes aligned to `align` directly from the raw
    /// allocator, regardless of size, and track it as a large allocation.
    pub fn alloc_aligned_to(&mut self, size: usize, align: usize) -> Result<Allocation, PoolError> {
        if !align.is_power_of_two() {
            return Err(PoolError::InvalidAlignment { align });
        }
        let buffer = self.allocator.allocate_aligned(align, size)?;
        let id = buffer.id();
        if let Err(err) = self.alloc_small(LARGE_RECORD_SIZE, true) {
            self.allocator.free(buffer);
            return Err(err);
        }
        self.large.push_head(buffer);
        Ok(Allocation::new(self.id, self.generation, size, Location::Large { id }))
    }

    fn alloc_small(&mut self, size: usize, aligned: bool) -> Result<Allocation, PoolError> {
        for index in self.current..self.blocks.len() {
            if let Some(offset) = self.blocks[index].try_bump(size, aligned) {
                return Ok(self.block_allocation(index, offset, size));
            }
        }
        self.alloc_block(size)
    }

    fn block_allocation(&self, index: usize, offset: usize, len: usize) -> Allocation {
        Allocation::new(self.id, self.generation, len, Location::Block { index, offset })
    }

    /// Append a block of the original size and claim `size` bytes from it.
    fn alloc_block(&mut self, size: usize) -> Result<Allocation, PoolError> {
        let buffer = self.allocator.allocate_aligned(POOL_ALIGNMENT, self.block_size)?;
        let mut block = Block::new(buffer, BLOCK_HEADER_SIZE);
        let offset = block.try_bump(size, true).ok_or(PoolError::SizeOverflow)?;

        // Every block from the search start up to the old tail just failed
        // this request. Blocks that keep failing stop being the start.
        let tail = self.blocks.len() - 1;
        let mut skip_to = self.current;
        for index in self.current..tail {
            if self.blocks[index].note_failure() > FAILURE_THRESHOLD {
                skip_to = index + 1;
            }
        }

        self.blocks.push(block);
        let new_index = self.blocks.len() - 1;
        self.current = skip_to;
        debug!(
            pool = self.label(),
            blocks = self.blocks.len(),
            current = self.current,
            request = size,
            "grow block chain"
        );
        Ok(self.block_allocation(new_index, offset, size))
    }

    fn alloc_large(&mut self, size: usize) -> Result<Allocation, PoolError> {
        let buffer = self.allocator.allocate(size)?;
        let id = buffer.id();
        if let Err(buffer) = self.large.try_reuse(buffer) {
            if let Err(err) = self.alloc_small(LARGE_RECORD_SIZE, true) {
                self.allocator.free(buffer);
                return Err(err);
            }
            self.large.push_head(buffer);
        }
        trace!(pool = self.label(), %id, size, "large allocation");
        Ok(Allocation::new(self.id, self.generation, size, Location::Large { id }))
    }

    /// Release a large allocation early.
    ///
    /// Returns [`FreeStatus::NotFound`] for anything the large slots do not
    /// currently hold (block allocations, already freed or reset buffers,
    /// other pools' handles), leaving the pool untouched.
    pub fn free(&mut self, allocation: &Allocation) -> FreeStatus {
        let Location::Large { id } = allocation.location else {
            return FreeStatus::NotFound;
        };
        if allocation.pool != self.id {
            return FreeStatus::NotFound;
        }
        match self.large.release(id) {
            Some(buffer) => {
                debug!(pool = self.label(), %id, "free large");
                self.allocator.free(buffer);
                FreeStatus::Freed
            }
            None => FreeStatus::NotFound,
        }
    }

    // ── Cleanup chain ────────────────────────────────────────────

    /// Register a cleanup record, reserving `data_size` bytes of caller data
    /// alongside it when non-zero. The record starts with no action.
    pub fn add_cleanup(&mut self, data_size: usize) -> Result<CleanupHandle, PoolError> {
        self.alloc_small(CLEANUP_RECORD_SIZE, true)?;
        let data = if data_size > 0 {
            Some(self.alloc(data_size)?)
        } else {
            None
        };
        let index = self.cleanup.push(data);
        debug!(pool = self.label(), index, data_size, "add cleanup");
        Ok(CleanupHandle {
            pool: self.id,
            index,
            data,
        })
    }

    /// Attach (or replace) the action of a cleanup record.
    pub fn set_cleanup(
        &mut self,
        handle: &CleanupHandle,
        action: impl Into<CleanupAction>,
    ) -> Result<(), PoolError> {
        self.cleanup_record(handle)?.action = Some(action.into());
        Ok(())
    }

    /// Detach the action of a cleanup record so destroy skips it. Returns
    /// the detached action.
    pub fn disable_cleanup(
        &mut self,
        handle: &CleanupHandle,
    ) -> Result<Option<CleanupAction>, PoolError> {
        Ok(self.cleanup_record(handle)?.action.take())
    }

    /// The caller data reserved with a cleanup record; empty when the record
    /// was added with `data_size == 0`.
    pub fn cleanup_data(&mut self, handle: &CleanupHandle) -> Result<&mut [u8], PoolError> {
        if handle.pool != self.id {
            return Err(PoolError::ForeignAllocation);
        }
        match handle.data {
            Some(data) => self.bytes_mut(&data),
            None => Ok(&mut []),
        }
    }

    /// Register `action` to run at destroy.
    pub fn on_destroy(&mut self, action: impl FnOnce() + 'static) -> Result<CleanupHandle, PoolError> {
        let handle = self.add_cleanup(0)?;
        self.set_cleanup(&handle, CleanupAction::custom(action))?;
        Ok(handle)
    }

    fn cleanup_record(
        &mut self,
        handle: &CleanupHandle,
    ) -> Result<&mut crate::cleanup::CleanupRecord, PoolError> {
        if handle.pool != self.id {
            return Err(PoolError::ForeignAllocation);
        }
        self.cleanup
            .get_mut(handle.index)
            .ok_or(PoolError::UnknownCleanup {
                index: handle.index,
            })
    }

    /// Run and disable the file cleanup registered for `fd`, ahead of
    /// destroy. Returns whether a matching action was found.
    #[cfg(unix)]
    pub fn run_file_cleanup(&mut self, fd: std::os::fd::RawFd) -> bool {
        let found = self.cleanup.iter_mut_from_head().find_map(|record| {
            let matches = record
                .action
                .as_ref()
                .and_then(CleanupAction::as_file)
                .is_some_and(|file| file.fd() == fd);
            if matches {
                record.action.take()
            } else {
                None
            }
        });
        match found {
            Some(action) => {
                action.run(&mut []);
                true
            }
            None => false,
        }
    }

    // ── Reset / destroy ──────────────────────────────────────────

    /// Release every large allocation and rewind every block.
    ///
    /// Large records stay in place, empty, for reuse. Cleanup actions are
    /// **not** run. All previously issued block handles become stale.
    pub fn reset(&mut self) {
        for buffer in self.large.drain_buffers() {
            self.allocator.free(buffer);
        }
        for block in &mut self.blocks {
            block.reset();
        }
        self.current = 0;
        self.generation = self.generation.wrapping_add(1);
        debug!(pool = self.label(), generation = self.generation, "reset pool");
    }

    /// Run every cleanup action (most recent first), then return all large
    /// buffers and blocks to the raw allocator.
    ///
    /// Dropping a pool does the same; this method makes the point explicit.
    pub fn destroy(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        let records: Vec<_> = self.cleanup.take_from_head().collect();
        for record in records {
            let Some(action) = record.action else {
                continue;
            };
            debug!(pool = self.label(), "run cleanup");
            let data = match record.data {
                Some(allocation) => self.resolve_any_generation(&allocation),
                None => None,
            };
            match data {
                Some(span) => action.run(span),
                None => action.run(&mut []),
            }
        }

        let label = self.name.as_deref().unwrap_or("-");
        for buffer in self.large.drain_buffers() {
            debug!(pool = label, id = %buffer.id(), "free large");
            self.allocator.free(buffer);
        }

        for block in self.blocks.drain(..) {
            debug!(pool = label, unused = block.stats().unused, "free block");
            self.allocator.free(block.into_buffer());
        }
    }

    // ── Handle resolution ────────────────────────────────────────

    fn span(&self, allocation: &Allocation) -> Result<(Span, usize), PoolError> {
        if allocation.pool != self.id {
            return Err(PoolError::ForeignAllocation);
        }
        if allocation.generation != self.generation {
            return Err(PoolError::StaleAllocation {
                handle_generation: allocation.generation,
                pool_generation: self.generation,
            });
        }
        match allocation.location {
            Location::Block { index, offset } => Ok((Span::Block(index), offset)),
            Location::Large { id } => self
                .large
                .position(id)
                .map(|slot| (Span::Large(slot), 0))
                .ok_or(PoolError::UnknownAllocation),
        }
    }

    fn storage(&self, span: Span) -> &[u8] {
        match span {
            Span::Block(index) => self.blocks[index].data(),
            Span::Large(slot) => self
                .large
                .get(slot)
                .and_then(|record| record.buffer())
                .map(RawBuffer::as_slice)
                .unwrap_or_default(),
        }
    }

    fn storage_mut(&mut self, span: Span) -> &mut [u8] {
        match span {
            Span::Block(index) => self.blocks[index].data_mut(),
            Span::Large(slot) => self
                .large
                .get_mut(slot)
                .and_then(|record| record.buffer_mut())
                .map(RawBuffer::as_mut_slice)
                .unwrap_or_default(),
        }
    }

    /// Bytes of `allocation` even if it predates the last reset. Used only
    /// for cleanup data at destroy.
    fn resolve_any_generation(&mut self, allocation: &Allocation) -> Option<&mut [u8]> {
        let (span, offset) = match allocation.location {
            Location::Block { index, offset } => (Span::Block(index), offset),
            Location::Large { id } => (Span::Large(self.large.position(id)?), 0),
        };
        self.storage_mut(span).get_mut(offset..offset + allocation.len)
    }

    /// The bytes of an allocation.
    pub fn bytes(&self, allocation: &Allocation) -> Result<&[u8], PoolError> {
        let (span, offset) = self.span(allocation)?;
        Ok(&self.storage(span)[offset..offset + allocation.len])
    }

    /// The bytes of an allocation, mutably.
    pub fn bytes_mut(&mut self, allocation: &Allocation) -> Result<&mut [u8], PoolError> {
        let (span, offset) = self.span(allocation)?;
        Ok(&mut self.storage_mut(span)[offset..offset + allocation.len])
    }

    /// Absolute address of an allocation's first byte.
    pub fn address(&self, allocation: &Allocation) -> Result<usize, PoolError> {
        let (span, offset) = self.span(allocation)?;
        let base = match span {
            Span::Block(index) => self.blocks[index].addr(),
            Span::Large(slot) => self
                .large
                .get(slot)
                .and_then(|record| record.buffer())
                .map(RawBuffer::addr)
                .ok_or(PoolError::UnknownAllocation)?,
        };
        Ok(base + offset)
    }

    // ── Most-recent-allocation primitives ────────────────────────

    /// Grow `allocation` by `additional` bytes without moving it.
    ///
    /// Succeeds only when the allocation ends exactly at its block's cursor
    /// and the block has `additional` more bytes. Large allocations never
    /// extend. Returns whether the extension happened.
    pub fn extend_in_place(
        &mut self,
        allocation: &mut Allocation,
        additional: usize,
    ) -> Result<bool, PoolError> {
        let (span, offset) = self.span(allocation)?;
        let Span::Block(index) = span else {
            return Ok(false);
        };
        let Some(end) = offset.checked_add(allocation.len) else {
            return Ok(false);
        };
        if self.blocks[index].try_extend(end, additional) {
            allocation.len += additional;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Give `allocation`'s bytes back if it is the most recent allocation in
    /// its block. All or nothing; returns whether the bytes were reclaimed.
    pub fn reclaim_last(&mut self, allocation: &Allocation) -> Result<bool, PoolError> {
        let (span, offset) = self.span(allocation)?;
        match span {
            Span::Block(index) => Ok(self.blocks[index].try_reclaim(offset, offset + allocation.len)),
            Span::Large(_) => Ok(false),
        }
    }

    /// Copy the first `len` bytes of `src` to the start of `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds either allocation's length.
    pub fn copy_region(
        &mut self,
        src: &Allocation,
        dst: &Allocation,
        len: usize,
    ) -> Result<(), PoolError> {
        assert!(
            len <= src.len && len <= dst.len,
            "copy of {len} bytes exceeds source ({}) or destination ({})",
            src.len,
            dst.len
        );
        let (src_span, src_off) = self.span(src)?;
        let (dst_span, dst_off) = self.span(dst)?;

        if src_span == dst_span {
            self.storage_mut(src_span)
                .copy_within(src_off..src_off + len, dst_off);
            return Ok(());
        }

        let (from, to): (&[u8], &mut [u8]) = match (src_span, dst_span) {
            (Span::Block(a), Span::Block(b)) => {
                let (from, to) = block_pair(&mut self.blocks, a, b);
                (from.data(), to.data_mut())
            }
            (Span::Large(a), Span::Large(b)) => {
                let (from, to) = self.large.pair_mut(a, b);
                (
                    from.buffer().map(RawBuffer::as_slice).unwrap_or_default(),
                    to.buffer_mut().map(RawBuffer::as_mut_slice).unwrap_or_default(),
                )
            }
            (Span::Block(a), Span::Large(b)) => (
                self.blocks[a].data(),
                self.large
                    .get_mut(b)
                    .and_then(|r| r.buffer_mut())
                    .map(RawBuffer::as_mut_slice)
                    .unwrap_or_default(),
            ),
            (Span::Large(a), Span::Block(b)) => (
                self.large
                    .get(a)
                    .and_then(|r| r.buffer())
                    .map(RawBuffer::as_slice)
                    .unwrap_or_default(),
                self.blocks[b].data_mut(),
            ),
        };
        to[dst_off..dst_off + len].copy_from_slice(&from[src_off..src_off + len]);
        Ok(())
    }

    // ── Introspection ────────────────────────────────────────────

    /// Identity of this pool.
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Current generation (number of resets so far, wrapping).
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Largest request served from the block chain.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Total size of every block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks in the chain.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Index of the block where small-allocation search starts.
    pub fn current_block(&self) -> usize {
        self.current
    }

    /// Per-block occupancy, in chain order.
    pub fn block_stats(&self) -> Vec<BlockStats> {
        self.blocks.iter().map(Block::stats).collect()
    }

    /// Number of large records (occupied or reusable).
    pub fn large_count(&self) -> usize {
        self.large.len()
    }

    /// Number of large records currently holding a buffer.
    pub fn large_live(&self) -> usize {
        self.large.occupied()
    }

    /// Number of cleanup records registered.
    pub fn cleanup_count(&self) -> usize {
        self.cleanup.len()
    }

    /// Number of cleanup records with an action attached.
    pub fn cleanup_armed(&self) -> usize {
        self.cleanup.armed()
    }

    /// The raw allocator backing this pool.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: RawAllocator> Drop for Pool<A> {
    fn drop(&mut self) {
        debug!(pool = self.label(), id = %self.id, "destroy pool");
        self.teardown();
    }
}

impl<A: RawAllocator> std::fmt::Debug for Pool<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("generation", &self.generation)
            .field("blocks", &self.blocks.len())
            .field("current", &self.current)
            .field("max", &self.max)
            .field("large", &self.large.len())
            .field("cleanup", &self.cleanup.len())
            .finish()
    }
}

fn block_pair(blocks: &mut [Block], a: usize, b: usize) -> (&Block, &mut Block) {
    if a < b {
        let (low, high) = blocks.split_at_mut(b);
        (&low[a], &mut high[0])
    } else {
        let (low, high) = blocks.split_at_mut(a);
        (&high[0], &mut low[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_core::layout::ALIGNMENT;

    fn pool(size: usize) -> Pool {
        Pool::create(PoolConfig::new(size)).unwrap()
    }

    #[test]
    fn first_allocation_follows_pool_header() {
        let mut pool = pool(4096);
        let a = pool.alloc(8).unwrap();
        assert_eq!(
            a.location(),
            Location::Block {
                index: 0,
                offset: POOL_HEADER_SIZE
            }
        );
    }

    #[test]
    fn grown_blocks_use_block_header() {
        let mut pool = pool(4096);
        let max = pool.max();
        pool.alloc(max).unwrap();
        let b = pool.alloc(16).unwrap();
        assert_eq!(
            b.location(),
            Location::Block {
                index: 1,
                offset: BLOCK_HEADER_SIZE
            }
        );
    }

    #[test]
    fn unaligned_requests_pack() {
        let mut pool = pool(4096);
        let a = pool.alloc_unaligned(3).unwrap();
        let b = pool.alloc_unaligned(5).unwrap();
        let (Location::Block { offset: oa, .. }, Location::Block { offset: ob, .. }) =
            (a.location(), b.location())
        else {
            panic!("expected block allocations");
        };
        assert_eq!(ob, oa + 3);
        let c = pool.alloc(1).unwrap();
        assert_eq!(pool.address(&c).unwrap() % ALIGNMENT, 0);
    }

    #[test]
    fn alloc_aligned_to_rejects_non_power_of_two() {
        let mut pool = pool(4096);
        assert!(matches!(
            pool.alloc_aligned_to(8, 12),
            Err(PoolError::InvalidAlignment { align: 12 })
        ));
        assert_eq!(pool.large_count(), 0);
    }

    #[test]
    fn alloc_aligned_to_is_large_and_aligned() {
        let mut pool = pool(4096);
        let a = pool.alloc_aligned_to(10, 256).unwrap();
        assert!(a.is_large());
        assert_eq!(pool.address(&a).unwrap() % 256, 0);
        assert_eq!(pool.free(&a), FreeStatus::Freed);
    }

    #[test]
    fn alloc_zeroed_clears_reused_bytes() {
        let mut pool = pool(4096);
        let a = pool.alloc(32).unwrap();
        pool.bytes_mut(&a).unwrap().fill(0xFF);
        pool.reset();
        let b = pool.alloc_zeroed(32).unwrap();
        assert_eq!(b.location(), a.location());
        assert!(pool.bytes(&b).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn extend_requires_most_recent() {
        let mut pool = pool(4096);
        let mut a = pool.alloc(8).unwrap();
        assert!(pool.extend_in_place(&mut a, 8).unwrap());
        assert_eq!(a.len(), 16);
        let _b = pool.alloc(8).unwrap();
        assert!(!pool.extend_in_place(&mut a, 8).unwrap());
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn extend_fails_when_block_full() {
        let mut pool = pool(4096);
        let max = pool.max();
        let mut a = pool.alloc(max).unwrap();
        assert!(!pool.extend_in_place(&mut a, 1).unwrap());
    }

    #[test]
    fn reclaim_last_rewinds_cursor() {
        let mut pool = pool(4096);
        let a = pool.alloc(8).unwrap();
        let b = pool.alloc(24).unwrap();
        assert!(!pool.reclaim_last(&a).unwrap());
        assert!(pool.reclaim_last(&b).unwrap());
        let c = pool.alloc(24).unwrap();
        assert_eq!(c.location(), b.location());
    }

    #[test]
    fn copy_region_between_blocks() {
        let mut pool = pool(4096);
        let src = pool.alloc(4).unwrap();
        pool.bytes_mut(&src).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        let max = pool.max();
        pool.alloc(max).unwrap();
        let dst = pool.alloc(8).unwrap();
        pool.copy_region(&src, &dst, 4).unwrap();
        assert_eq!(&pool.bytes(&dst).unwrap()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn copy_region_block_to_large() {
        let mut pool = pool(4096);
        let src = pool.alloc(4).unwrap();
        pool.bytes_mut(&src).unwrap().copy_from_slice(&[9, 8, 7, 6]);
        let dst = pool.alloc(pool.max() + 1).unwrap();
        pool.copy_region(&src, &dst, 4).unwrap();
        assert_eq!(&pool.bytes(&dst).unwrap()[..4], &[9, 8, 7, 6]);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn copy_region_checks_length() {
        let mut pool = pool(4096);
        let src = pool.alloc(4).unwrap();
        let dst = pool.alloc(2).unwrap();
        let _ = pool.copy_region(&src, &dst, 4);
    }

    #[test]
    fn stale_handle_rejected_after_reset() {
        let mut pool = pool(4096);
        let a = pool.alloc(8).unwrap();
        pool.reset();
        assert_eq!(
            pool.bytes(&a).unwrap_err(),
            PoolError::StaleAllocation {
                handle_generation: 0,
                pool_generation: 1
            }
        );
    }

    #[test]
    fn foreign_handle_rejected() {
        let mut a = pool(4096);
        let b = pool(4096);
        let handle = a.alloc(8).unwrap();
        assert_eq!(b.bytes(&handle).unwrap_err(), PoolError::ForeignAllocation);
    }

    #[test]
    fn freed_large_handle_is_unknown() {
        let mut pool = pool(4096);
        let a = pool.alloc(pool.max() + 1).unwrap();
        assert_eq!(pool.free(&a), FreeStatus::Freed);
        assert_eq!(pool.bytes(&a).unwrap_err(), PoolError::UnknownAllocation);
    }

    #[test]
    fn disable_cleanup_returns_action() {
        let mut pool = pool(4096);
        let handle = pool.add_cleanup(0).unwrap();
        assert!(pool.disable_cleanup(&handle).unwrap().is_none());
        pool.set_cleanup(&handle, CleanupAction::custom(|| {})).unwrap();
        assert_eq!(pool.cleanup_armed(), 1);
        assert!(pool.disable_cleanup(&handle).unwrap().is_some());
        assert_eq!(pool.cleanup_armed(), 0);
    }

    #[test]
    fn cleanup_data_is_pool_memory() {
        let mut pool = pool(4096);
        let handle = pool.add_cleanup(12).unwrap();
        let data = handle.data().unwrap();
        assert_eq!(data.len(), 12);
        assert!(!data.is_large());
        assert!(pool.add_cleanup(0).unwrap().data().is_none());
    }

    #[test]
    fn cleanup_data_resolves_reserved_bytes() {
        let mut pool = pool(4096);
        let with_data = pool.add_cleanup(6).unwrap();
        pool.cleanup_data(&with_data).unwrap().copy_from_slice(b"lagoon");
        assert_eq!(pool.bytes(&with_data.data().unwrap()).unwrap(), b"lagoon");
        let bare = pool.add_cleanup(0).unwrap();
        assert!(pool.cleanup_data(&bare).unwrap().is_empty());
    }

    #[test]
    fn debug_reports_shape() {
        let pool = Pool::create(PoolConfig::new(4096).with_name("req")).unwrap();
        let text = format!("{pool:?}");
        assert!(text.contains("\"req\""));
        assert!(text.contains("blocks: 1"));
    }
}
