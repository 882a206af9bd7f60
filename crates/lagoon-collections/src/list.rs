//! Chained list of fixed-capacity parts allocated from a pool.
//!
//! A [`List`] appends into its last part until that part is full, then
//! allocates a new part of the same capacity. Parts are never moved,
//! shrunk or reused, so a slot stays where it was pushed until the pool is
//! reset or destroyed. Reading is by traversal, part by part.

use std::num::NonZeroUsize;

use lagoon_core::layout::{LIST_HEADER_SIZE, LIST_PART_HEADER_SIZE};
use lagoon_core::RawAllocator;
use lagoon_pool::{Allocation, Pool, PoolError, PoolId};
use tracing::trace;

use crate::array::byte_len;

#[derive(Clone, Debug)]
struct PartSlot {
    /// Absent for the first part, which lives in the list header.
    header: Option<Allocation>,
    elements: Allocation,
    count: usize,
}

/// A growable sequence of fixed-size byte elements stored in chained parts.
#[derive(Clone, Debug)]
pub struct List {
    header: Option<Allocation>,
    first: PartSlot,
    rest: Vec<PartSlot>,
    part_capacity: NonZeroUsize,
    element_size: usize,
}

impl List {
    /// Allocate a list header and the first part.
    pub fn create<A: RawAllocator>(
        pool: &mut Pool<A>,
        part_capacity: NonZeroUsize,
        element_size: usize,
    ) -> Result<Self, PoolError> {
        let header = pool.alloc(LIST_HEADER_SIZE)?;
        let mut list = Self::init(pool, part_capacity, element_size)?;
        list.header = Some(header);
        Ok(list)
    }

    /// Allocate only the first part's buffer.
    pub fn init<A: RawAllocator>(
        pool: &mut Pool<A>,
        part_capacity: NonZeroUsize,
        element_size: usize,
    ) -> Result<Self, PoolError> {
        let elements = pool.alloc(byte_len(part_capacity.get(), element_size)?)?;
        Ok(Self {
            header: None,
            first: PartSlot {
                header: None,
                elements,
                count: 0,
            },
            rest: Vec::new(),
            part_capacity,
            element_size,
        })
    }

    fn last_mut(&mut self) -> &mut PartSlot {
        self.rest.last_mut().unwrap_or(&mut self.first)
    }

    fn slots(&self) -> impl Iterator<Item = &PartSlot> {
        std::iter::once(&self.first).chain(&self.rest)
    }

    /// Append one element and return its (uninitialised) slot.
    pub fn push<'p, A: RawAllocator>(
        &mut self,
        pool: &'p mut Pool<A>,
    ) -> Result<&'p mut [u8], PoolError> {
        let capacity = self.part_capacity.get();
        let element_size = self.element_size;
        if self.last_mut().count == capacity {
            // Refuse to extend a list that predates a reset.
            pool.bytes(&self.last_mut().elements)?;
            let header = pool.alloc(LIST_PART_HEADER_SIZE)?;
            let elements = pool.alloc(byte_len(capacity, element_size)?)?;
            self.rest.push(PartSlot {
                header: Some(header),
                elements,
                count: 0,
            });
            trace!(parts = self.part_count(), "list part appended");
        }

        let last = self.last_mut();
        let start = last.count * element_size;
        let bytes = pool.bytes_mut(&last.elements)?;
        last.count += 1;
        Ok(&mut bytes[start..start + element_size])
    }

    /// The parts in append order.
    pub fn parts<'p, A: RawAllocator>(
        &self,
        pool: &'p Pool<A>,
    ) -> Result<impl Iterator<Item = Part<'p>> + 'p, PoolError> {
        let capacity = self.part_capacity.get();
        let parts = self
            .slots()
            .map(|slot| -> Result<Part<'p>, PoolError> {
                Ok(Part {
                    bytes: pool.bytes(&slot.elements)?,
                    count: slot.count,
                    capacity,
                    element_size: self.element_size,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.into_iter())
    }

    /// Every element in push order.
    pub fn iter<'p, A: RawAllocator>(
        &self,
        pool: &'p Pool<A>,
    ) -> Result<impl Iterator<Item = &'p [u8]> + 'p, PoolError> {
        Ok(self.parts(pool)?.flat_map(|part| part.iter()))
    }

    /// Total elements across all parts.
    pub fn len(&self) -> usize {
        self.slots().map(|slot| slot.count).sum()
    }

    /// Whether no element has been pushed.
    pub fn is_empty(&self) -> bool {
        self.first.count == 0
    }

    /// Number of parts, including a trailing empty one.
    pub fn part_count(&self) -> usize {
        1 + self.rest.len()
    }

    /// Elements per part.
    pub fn part_capacity(&self) -> NonZeroUsize {
        self.part_capacity
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// The pool this list lives in.
    pub fn pool(&self) -> PoolId {
        self.first.elements.pool()
    }

    /// Bytes the list has reserved in its pool, headers included.
    pub fn reserved(&self) -> usize {
        let headers = self
            .header
            .iter()
            .chain(self.slots().filter_map(|slot| slot.header.as_ref()));
        headers.map(Allocation::len).sum::<usize>()
            + self.slots().map(|slot| slot.elements.len()).sum::<usize>()
    }
}

/// A read-only view of one list part.
#[derive(Clone, Copy, Debug)]
pub struct Part<'p> {
    bytes: &'p [u8],
    count: usize,
    capacity: usize,
    element_size: usize,
}

impl<'p> Part<'p> {
    /// Elements stored in this part.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether this part holds nothing yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Elements this part can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The stored elements as one byte slice.
    pub fn as_bytes(&self) -> &'p [u8] {
        &self.bytes[..self.count * self.element_size]
    }

    /// The stored elements in push order.
    pub fn iter(&self) -> impl Iterator<Item = &'p [u8]> + 'p {
        let bytes = self.as_bytes();
        let size = self.element_size;
        (0..self.count).map(move |i| &bytes[i * size..(i + 1) * size])
    }
}
