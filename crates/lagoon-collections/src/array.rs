//! Growable contiguous array allocated from a pool.
//!
//! An [`Array`] owns one element buffer inside its pool. When the buffer is
//! full it first tries to grow in place, which works only while the buffer
//! is the most recent allocation in its block; otherwise it allocates a
//! larger buffer, copies the live elements over and abandons the old one
//! to be reclaimed by the next reset or destroy.

use lagoon_core::layout::ARRAY_HEADER_SIZE;
use lagoon_core::RawAllocator;
use lagoon_pool::{Allocation, Pool, PoolError, PoolId};
use tracing::trace;

/// A growable sequence of fixed-size byte elements in a pool.
#[derive(Clone, Debug)]
pub struct Array {
    /// Present when created with [`Array::create`].
    header: Option<Allocation>,
    elements: Allocation,
    count: usize,
    element_size: usize,
    capacity: usize,
}

pub(crate) fn byte_len(count: usize, element_size: usize) -> Result<usize, PoolError> {
    count
        .checked_mul(element_size)
        .ok_or(PoolError::SizeOverflow)
}

impl Array {
    /// Allocate an array header and a buffer for `capacity` elements of
    /// `element_size` bytes.
    pub fn create<A: RawAllocator>(
        pool: &mut Pool<A>,
        capacity: usize,
        element_size: usize,
    ) -> Result<Self, PoolError> {
        let header = pool.alloc(ARRAY_HEADER_SIZE)?;
        let mut array = Self::init(pool, capacity, element_size)?;
        array.header = Some(header);
        Ok(array)
    }

    /// Allocate only the element buffer, for arrays embedded in some other
    /// structure.
    pub fn init<A: RawAllocator>(
        pool: &mut Pool<A>,
        capacity: usize,
        element_size: usize,
    ) -> Result<Self, PoolError> {
        let elements = pool.alloc(byte_len(capacity, element_size)?)?;
        Ok(Self {
            header: None,
            elements,
            count: 0,
            element_size,
            capacity,
        })
    }

    /// Append one element and return its (uninitialised) slot.
    ///
    /// A full array grows by one element in place when possible, otherwise
    /// moves to a buffer of twice the capacity.
    pub fn push<'p, A: RawAllocator>(
        &mut self,
        pool: &'p mut Pool<A>,
    ) -> Result<&'p mut [u8], PoolError> {
        if self.count == self.capacity {
            if pool.extend_in_place(&mut self.elements, self.element_size)? {
                self.capacity += 1;
            } else {
                let grown = self
                    .capacity
                    .checked_mul(2)
                    .ok_or(PoolError::SizeOverflow)?
                    .max(1);
                self.relocate(pool, grown)?;
            }
        }
        self.claim(pool, 1)
    }

    /// Append `n` elements and return their contiguous slots.
    ///
    /// Grows in place by exactly `n` elements when possible, otherwise moves
    /// to a buffer of `2 * max(n, capacity)` elements.
    pub fn push_n<'p, A: RawAllocator>(
        &mut self,
        pool: &'p mut Pool<A>,
        n: usize,
    ) -> Result<&'p mut [u8], PoolError> {
        let needed = self.count.checked_add(n).ok_or(PoolError::SizeOverflow)?;
        if needed > self.capacity {
            let additional = byte_len(n, self.element_size)?;
            if pool.extend_in_place(&mut self.elements, additional)? {
                self.capacity += n;
            } else {
                let grown = n
                    .max(self.capacity)
                    .checked_mul(2)
                    .ok_or(PoolError::SizeOverflow)?;
                self.relocate(pool, grown)?;
            }
        }
        self.claim(pool, n)
    }

    fn claim<'p, A: RawAllocator>(
        &mut self,
        pool: &'p mut Pool<A>,
        n: usize,
    ) -> Result<&'p mut [u8], PoolError> {
        let start = self.count * self.element_size;
        let end = start + n * self.element_size;
        let bytes = pool.bytes_mut(&self.elements)?;
        self.count += n;
        Ok(&mut bytes[start..end])
    }

    fn relocate<A: RawAllocator>(
        &mut self,
        pool: &mut Pool<A>,
        capacity: usize,
    ) -> Result<(), PoolError> {
        let fresh = pool.alloc(byte_len(capacity, self.element_size)?)?;
        pool.copy_region(&self.elements, &fresh, self.count * self.element_size)?;
        trace!(from = self.capacity, to = capacity, "array relocated");
        self.elements = fresh;
        self.capacity = capacity;
        Ok(())
    }

    /// Give the array's memory back to the pool where that is possible:
    /// the element buffer if it is the most recent allocation in its block,
    /// then the header likewise. Returns the number of bytes reclaimed.
    ///
    /// Anything else (including arrays from an earlier pool generation)
    /// is left for reset or destroy.
    pub fn destroy<A: RawAllocator>(self, pool: &mut Pool<A>) -> usize {
        let mut reclaimed = 0;
        if matches!(pool.reclaim_last(&self.elements), Ok(true)) {
            reclaimed += self.elements.len();
        }
        if let Some(header) = self.header {
            if matches!(pool.reclaim_last(&header), Ok(true)) {
                reclaimed += header.len();
            }
        }
        trace!(reclaimed, "array destroyed");
        reclaimed
    }

    /// Number of elements pushed.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no element has been pushed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Elements the current buffer holds before the next growth.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// The pool this array lives in.
    pub fn pool(&self) -> PoolId {
        self.elements.pool()
    }

    /// The live elements as one byte slice.
    pub fn as_bytes<'p, A: RawAllocator>(&self, pool: &'p Pool<A>) -> Result<&'p [u8], PoolError> {
        let bytes = pool.bytes(&self.elements)?;
        Ok(&bytes[..self.count * self.element_size])
    }

    /// Element `index`, or `None` past the end.
    pub fn get<'p, A: RawAllocator>(
        &self,
        pool: &'p Pool<A>,
        index: usize,
    ) -> Result<Option<&'p [u8]>, PoolError> {
        let bytes = self.as_bytes(pool)?;
        if index >= self.count {
            return Ok(None);
        }
        let start = index * self.element_size;
        Ok(Some(&bytes[start..start + self.element_size]))
    }

    /// Element `index` mutably, or `None` past the end.
    pub fn get_mut<'p, A: RawAllocator>(
        &self,
        pool: &'p mut Pool<A>,
        index: usize,
    ) -> Result<Option<&'p mut [u8]>, PoolError> {
        let bytes = pool.bytes_mut(&self.elements)?;
        if index >= self.count {
            return Ok(None);
        }
        let start = index * self.element_size;
        Ok(Some(&mut bytes[start..start + self.element_size]))
    }

    /// Iterate the live elements in push order.
    pub fn iter<'p, A: RawAllocator>(
        &self,
        pool: &'p Pool<A>,
    ) -> Result<impl Iterator<Item = &'p [u8]> + 'p, PoolError> {
        let bytes = self.as_bytes(pool)?;
        let size = self.element_size;
        Ok((0..self.count).map(move |i| &bytes[i * size..(i + 1) * size]))
    }
}
