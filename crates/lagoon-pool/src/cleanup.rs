//! Deferred cleanup actions run when a pool is destroyed.
//!
//! Records are kept in registration order; the chain head is the most
//! recently registered record, and destroy walks from the head. Actions
//! therefore run last-registered-first, mirroring nested teardown.

use std::fmt;

#[cfg(unix)]
use crate::file::FileCleanup;
use crate::handle::Allocation;

/// A release action attached to a cleanup record.
///
/// Actions have no return channel: a failing action cannot abort destroy or
/// be retried, so it must report its own problems (typically via `tracing`).
pub enum CleanupAction {
    /// Run a closure that owns whatever it needs to release.
    Custom(Box<dyn FnOnce()>),
    /// Run a closure with the record's reserved data bytes.
    ///
    /// The slice is empty when the record has no data region, or when the
    /// data region was a large allocation already released by `reset()`.
    WithData(Box<dyn FnOnce(&mut [u8])>),
    /// Close (and optionally delete) a file.
    #[cfg(unix)]
    File(FileCleanup),
}

impl CleanupAction {
    /// Wrap a closure.
    pub fn custom(action: impl FnOnce() + 'static) -> Self {
        Self::Custom(Box::new(action))
    }

    /// Wrap a closure that receives the record's data bytes.
    pub fn with_data(action: impl FnOnce(&mut [u8]) + 'static) -> Self {
        Self::WithData(Box::new(action))
    }

    pub(crate) fn run(self, data: &mut [u8]) {
        match self {
            Self::Custom(action) => action(),
            Self::WithData(action) => action(data),
            #[cfg(unix)]
            Self::File(file) => file.run(),
        }
    }

    #[cfg(unix)]
    pub(crate) fn as_file(&self) -> Option<&FileCleanup> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }
}

impl fmt::Debug for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::WithData(_) => f.write_str("WithData(..)"),
            #[cfg(unix)]
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
        }
    }
}

#[cfg(unix)]
impl From<FileCleanup> for CleanupAction {
    fn from(file: FileCleanup) -> Self {
        Self::File(file)
    }
}

#[derive(Debug, Default)]
pub(crate) struct CleanupRecord {
    pub(crate) action: Option<CleanupAction>,
    pub(crate) data: Option<Allocation>,
}

#[derive(Debug, Default)]
pub(crate) struct CleanupChain {
    records: Vec<CleanupRecord>,
}

impl CleanupChain {
    /// Register a record with no action yet; returns its index.
    pub(crate) fn push(&mut self, data: Option<Allocation>) -> usize {
        self.records.push(CleanupRecord { action: None, data });
        self.records.len() - 1
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut CleanupRecord> {
        self.records.get_mut(index)
    }

    /// Records from the head (most recent) to the tail.
    pub(crate) fn iter_mut_from_head(&mut self) -> impl Iterator<Item = &mut CleanupRecord> {
        self.records.iter_mut().rev()
    }

    /// Remove every record, head first, for execution.
    pub(crate) fn take_from_head(&mut self) -> impl Iterator<Item = CleanupRecord> {
        std::mem::take(&mut self.records).into_iter().rev()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn armed(&self) -> usize {
        self.records.iter().filter(|r| r.action.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn take_from_head_is_reverse_registration() {
        let mut chain = CleanupChain::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let index = chain.push(None);
            let order = Rc::clone(&order);
            chain.get_mut(index).unwrap().action =
                Some(CleanupAction::custom(move || order.borrow_mut().push(i)));
        }
        for record in chain.take_from_head() {
            record.action.unwrap().run(&mut []);
        }
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert_eq!(chain.len(), 0);
    }

    #[test]
    fn with_data_receives_bytes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let action = CleanupAction::with_data(move |data| sink.borrow_mut().extend_from_slice(data));
        action.run(&mut [1, 2, 3]);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn armed_counts_records_with_actions() {
        let mut chain = CleanupChain::default();
        chain.push(None);
        let index = chain.push(None);
        chain.get_mut(index).unwrap().action = Some(CleanupAction::custom(|| {}));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.armed(), 1);
    }
}
