//! Raw allocation error type.

/// Failure reported by a [`RawAllocator`](crate::RawAllocator).
///
/// Allocation failures are always returned, never raised as panics.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The underlying heap could not satisfy the request.
    #[error("allocation of {size} bytes (align {align}) failed")]
    OutOfMemory {
        /// Number of bytes requested.
        size: usize,
        /// Alignment requested.
        align: usize,
    },
    /// The size/alignment pair does not form a valid layout (alignment not a
    /// power of two, or size overflowing `isize` once rounded).
    #[error("invalid layout: {size} bytes with align {align}")]
    InvalidLayout {
        /// Number of bytes requested.
        size: usize,
        /// Alignment requested.
        align: usize,
    },
}

impl AllocError {
    /// Number of bytes the failed request asked for.
    pub fn size(&self) -> usize {
        match self {
            Self::OutOfMemory { size, .. } | Self::InvalidLayout { size, .. } => *size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_size_and_align() {
        let err = AllocError::OutOfMemory {
            size: 4096,
            align: 16,
        };
        assert_eq!(err.to_string(), "allocation of 4096 bytes (align 16) failed");
        assert_eq!(err.size(), 4096);
    }

    #[test]
    fn invalid_layout_reports_size() {
        let err = AllocError::InvalidLayout { size: 7, align: 3 };
        assert_eq!(err.size(), 7);
        assert!(err.to_string().contains("align 3"));
    }
}
