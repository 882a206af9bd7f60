//! Raw memory interface for Lagoon pools.
//!
//! Everything a pool needs from the outside world lives here: the
//! [`RawAllocator`] trait, the owned [`RawBuffer`] it hands out, the
//! std-heap adapter [`SystemAllocator`], and the layout constants shared by
//! the pool and the collections built on top of it.
//!
//! # Architecture
//!
//! ```text
//! lagoon-collections (Array, List)
//!         │
//!         ▼
//! lagoon-pool (Pool: blocks, large slots, cleanup chain)
//!         │
//!         ▼
//! lagoon-core (RawAllocator → RawBuffer)
//! ```
//!
//! This is the only Lagoon crate that contains `unsafe` code, confined to
//! [`buffer`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod buffer;
pub mod error;
pub mod layout;

pub use alloc::{RawAllocator, SystemAllocator};
pub use buffer::{RawBuffer, RawId};
pub use error::AllocError;
pub use layout::{align_up, checked_align_up, is_aligned};
