#![forbid(unsafe_code)]

//! Error types shared by the backing list adapter and the windowing engine.
//!
//! Three families exist:
//!
//! - [`InvariantViolation`]: a caller contract breach (re-entrant mutation,
//!   duplicate identities). Fatal; surface it, do not swallow it.
//! - [`VirtualizeError::UnsupportedOperation`]: a `Move` or `Replace` change
//!   reached a consumer that cannot apply it. Fatal.
//! - [`ArgumentError`]: invalid indices, ranges, or extents. Always detected
//!   before any state is touched, so the caller may recover.

use std::fmt;

use crate::change::ChangeKind;

/// Top-level error type for vwin operations.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualizeError {
    /// A caller contract was breached.
    InvariantViolation(InvariantViolation),
    /// A change event kind that cannot be applied incrementally.
    UnsupportedOperation(ChangeKind),
    /// An argument was rejected before any mutation happened.
    Argument(ArgumentError),
}

impl VirtualizeError {
    /// Whether the caller can reasonably continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Argument(_))
    }
}

impl fmt::Display for VirtualizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvariantViolation(v) => write!(f, "invariant violation: {v}"),
            Self::UnsupportedOperation(kind) => {
                write!(f, "unsupported operation: {kind} changes cannot be windowed")
            }
            Self::Argument(err) => write!(f, "invalid argument: {err}"),
        }
    }
}

impl std::error::Error for VirtualizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvariantViolation(v) => Some(v),
            Self::UnsupportedOperation(_) => None,
            Self::Argument(err) => Some(err),
        }
    }
}

impl From<InvariantViolation> for VirtualizeError {
    fn from(v: InvariantViolation) -> Self {
        Self::InvariantViolation(v)
    }
}

impl From<ArgumentError> for VirtualizeError {
    fn from(err: ArgumentError) -> Self {
        Self::Argument(err)
    }
}

/// A breached caller contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A mutating entry point was called while another mutation of the same
    /// window was still in progress.
    ReentrantMutation {
        /// Entry point that attempted the nested mutation.
        operation: &'static str,
        /// Entry point that currently holds the mutation guard.
        active: &'static str,
    },
    /// An identity was about to appear twice in the rendered window.
    DuplicateItem {
        /// Window index at which the duplicate was rejected.
        index: usize,
    },
    /// The rendered window was not a subsequence of the backing list.
    WindowOutOfOrder {
        /// Window index of the first entry out of backing order.
        index: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReentrantMutation { operation, active } => write!(
                f,
                "re-entrant mutation: `{operation}` called while `{active}` is in progress"
            ),
            Self::DuplicateItem { index } => {
                write!(f, "duplicate item identity at window index {index}")
            }
            Self::WindowOutOfOrder { index } => write!(
                f,
                "rendered window entry {index} is not in backing list order"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// An argument rejected before any state mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// An insertion or lookup index past the end of a sequence.
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Length of the sequence.
        len: usize,
    },
    /// A range extending past the end of a sequence.
    RangeOutOfBounds {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Length of the sequence.
        len: usize,
    },
    /// A range whose start lies after its end.
    InvertedRange {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
    },
    /// An extent that is negative, NaN, or infinite.
    InvalidExtent(f64),
    /// A scroll offset that is NaN or infinite.
    InvalidOffset(f64),
    /// A change event whose indices do not fit the backing list it came with.
    ChangeOutOfBounds {
        /// Kind of the offending change.
        kind: ChangeKind,
        /// First index touched by the change.
        index: usize,
        /// Number of items carried by the change.
        count: usize,
        /// Length of the backing list.
        len: usize,
    },
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::RangeOutOfBounds { start, end, len } => {
                write!(f, "range {start}..{end} out of bounds for length {len}")
            }
            Self::InvertedRange { start, end } => {
                write!(f, "range start {start} is after end {end}")
            }
            Self::InvalidExtent(value) => {
                write!(f, "extent {value} must be finite and non-negative")
            }
            Self::InvalidOffset(value) => write!(f, "offset {value} must be finite"),
            Self::ChangeOutOfBounds {
                kind,
                index,
                count,
                len,
            } => write!(
                f,
                "{kind} of {count} item(s) at index {index} does not fit list of length {len}"
            ),
        }
    }
}

impl std::error::Error for ArgumentError {}

/// Standard result type for vwin APIs.
pub type Result<T> = std::result::Result<T, VirtualizeError>;

/// Validate that `start..end` is a well-formed range within `len`.
pub fn check_range(start: usize, end: usize, len: usize) -> std::result::Result<(), ArgumentError> {
    if start > end {
        return Err(ArgumentError::InvertedRange { start, end });
    }
    if end > len {
        return Err(ArgumentError::RangeOutOfBounds { start, end, len });
    }
    Ok(())
}

/// Validate that `index` is a valid insertion point for a sequence of `len`.
pub fn check_insertion_index(index: usize, len: usize) -> std::result::Result<(), ArgumentError> {
    if index > len {
        return Err(ArgumentError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Validate a measured or configured extent.
pub fn check_extent(value: f64) -> std::result::Result<f64, ArgumentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ArgumentError::InvalidExtent(value))
    }
}
