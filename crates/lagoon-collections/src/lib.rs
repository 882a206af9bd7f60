//! Containers that live entirely inside a Lagoon [`Pool`](lagoon_pool::Pool).
//!
//! - [`Array`]: one contiguous element buffer that doubles on overflow and
//!   extends in place when it is the most recent allocation in its block.
//! - [`List`]: a chain of fixed-capacity parts; appending never moves
//!   existing elements.
//!
//! Elements are untyped fixed-size byte slots. Both containers hold
//! [`Allocation`](lagoon_pool::Allocation) handles, so every operation takes
//! the owning pool explicitly, and a pool reset turns further access into a
//! [`PoolError::StaleAllocation`](lagoon_pool::PoolError::StaleAllocation).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod list;

pub use array::Array;
pub use list::{List, Part};
