//! Tracking for allocations served outside the block chain.
//!
//! Each record owns at most one raw buffer. Freeing a buffer empties its
//! record but keeps the record, so later large allocations can reuse the
//! slot instead of bump-allocating a new record. Records are kept newest
//! last; "the head of the chain" is the end of the vector.

use lagoon_core::{RawBuffer, RawId};

/// How many records, starting from the head, are checked for a reusable
/// slot before a new record is created.
pub(crate) const LARGE_SCAN_LIMIT: usize = 4;

#[derive(Debug, Default)]
pub(crate) struct LargeRecord {
    buffer: Option<RawBuffer>,
}

impl LargeRecord {
    pub(crate) fn buffer(&self) -> Option<&RawBuffer> {
        self.buffer.as_ref()
    }

    pub(crate) fn buffer_mut(&mut self) -> Option<&mut RawBuffer> {
        self.buffer.as_mut()
    }
}

#[derive(Debug, Default)]
pub(crate) struct LargeSlots {
    records: Vec<LargeRecord>,
}

impl LargeSlots {
    /// Place `buffer` into the first empty record among the
    /// [`LARGE_SCAN_LIMIT`] records nearest the head.
    ///
    /// Hands the buffer back if no such record exists.
    pub(crate) fn try_reuse(&mut self, buffer: RawBuffer) -> Result<(), RawBuffer> {
        match self
            .records
            .iter_mut()
            .rev()
            .take(LARGE_SCAN_LIMIT)
            .find(|record| record.buffer.is_none())
        {
            Some(record) => {
                record.buffer = Some(buffer);
                Ok(())
            }
            None => Err(buffer),
        }
    }

    /// Insert a new record holding `buffer` at the head.
    pub(crate) fn push_head(&mut self, buffer: RawBuffer) {
        self.records.push(LargeRecord {
            buffer: Some(buffer),
        });
    }

    /// Position of the record currently holding buffer `id`.
    pub(crate) fn position(&self, id: RawId) -> Option<usize> {
        self.records
            .iter()
            .rposition(|record| record.buffer.as_ref().is_some_and(|b| b.id() == id))
    }

    pub(crate) fn get(&self, slot: usize) -> Option<&LargeRecord> {
        self.records.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut LargeRecord> {
        self.records.get_mut(slot)
    }

    /// Empty the record holding buffer `id`, returning the buffer.
    pub(crate) fn release(&mut self, id: RawId) -> Option<RawBuffer> {
        let slot = self.position(id)?;
        self.records[slot].buffer.take()
    }

    /// Empty every record, head first, leaving the records in place.
    pub(crate) fn drain_buffers(&mut self) -> impl Iterator<Item = RawBuffer> + '_ {
        self.records
            .iter_mut()
            .rev()
            .filter_map(|record| record.buffer.take())
    }

    /// Number of records, occupied or not.
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of records currently holding a buffer.
    pub(crate) fn occupied(&self) -> usize {
        self.records.iter().filter(|r| r.buffer.is_some()).count()
    }

    /// Disjoint access to two different records.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> (&LargeRecord, &mut LargeRecord) {
        assert_ne!(a, b, "pair_mut requires distinct slots");
        if a < b {
            let (low, high) = self.records.split_at_mut(b);
            (&low[a], &mut high[0])
        } else {
            let (low, high) = self.records.split_at_mut(a);
            (&high[0], &mut low[b])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> RawBuffer {
        RawBuffer::new(8, 8).unwrap()
    }

    #[test]
    fn reuse_fails_on_empty_slots() {
        let mut slots = LargeSlots::default();
        assert!(slots.try_reuse(buffer()).is_err());
    }

    #[test]
    fn released_slot_is_reused() {
        let mut slots = LargeSlots::default();
        let b = buffer();
        let id = b.id();
        slots.push_head(b);
        slots.push_head(buffer());
        assert!(slots.release(id).is_some());
        assert_eq!(slots.occupied(), 1);

        let fresh = buffer();
        let fresh_id = fresh.id();
        assert!(slots.try_reuse(fresh).is_ok());
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.position(fresh_id), Some(0));
    }

    #[test]
    fn reuse_scan_is_bounded() {
        let mut slots = LargeSlots::default();
        let deep = buffer();
        let deep_id = deep.id();
        slots.push_head(deep);
        for _ in 0..LARGE_SCAN_LIMIT {
            slots.push_head(buffer());
        }
        slots.release(deep_id).unwrap();

        // The only empty slot is the fifth from the head.
        assert!(slots.try_reuse(buffer()).is_err());
    }

    #[test]
    fn release_unknown_is_none() {
        let mut slots = LargeSlots::default();
        slots.push_head(buffer());
        let other = buffer();
        assert!(slots.release(other.id()).is_none());
        assert_eq!(slots.occupied(), 1);
    }

    #[test]
    fn drain_keeps_records() {
        let mut slots = LargeSlots::default();
        slots.push_head(buffer());
        slots.push_head(buffer());
        assert_eq!(slots.drain_buffers().count(), 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.occupied(), 0);
    }
}
