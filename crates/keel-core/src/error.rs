//! Error types for the Keel workspace.
//!
//! Caller-facing violations are split by subsystem: [`AccessError`] for the
//! container and its cursors, [`PointerError`] for tracked pointers. Both are
//! returned synchronously and never retried. [`Inconsistency`] describes a
//! broken registry invariant; it is a defect, not misuse, and is only ever
//! raised as a panic.

use std::error::Error;
use std::fmt;

use crate::id::{CursorKey, OwnerId, PointerId};

/// Why a cursor operation was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorMisuse {
    /// Dereference of a position with no item (the end sentinel).
    NoItem,
    /// Stepping forward from the end sentinel.
    PastEnd,
    /// Stepping backward from the beginning.
    BeforeBeginning,
    /// The store a non-owning cursor referred to has been reclaimed.
    StoreReclaimed,
}

impl fmt::Display for CursorMisuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoItem => write!(f, "position has no item"),
            Self::PastEnd => write!(f, "no next position after the end"),
            Self::BeforeBeginning => write!(f, "no previous position before the beginning"),
            Self::StoreReclaimed => write!(f, "backing store was reclaimed"),
        }
    }
}

/// Errors from container access and cursor operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessError {
    /// An index or position outside valid bounds. Covers empty-container
    /// access and relative jumps that would leave `[0, len]`.
    OutOfRange {
        /// The operation that failed.
        op: &'static str,
        /// The index requested, or the origin of a relative jump.
        index: usize,
        /// The relative offset, for jumps.
        offset: Option<isize>,
        /// The container length at the time of the call.
        len: usize,
    },
    /// A half-open span whose start lies past its end.
    ReversedSpan {
        /// The operation that failed.
        op: &'static str,
        /// Requested start of the span.
        first: usize,
        /// Requested end of the span.
        last: usize,
    },
    /// A cursor was used in a state that does not support the operation.
    InvalidCursorUse {
        /// The operation that failed.
        op: &'static str,
        /// What was wrong with the cursor.
        reason: CursorMisuse,
    },
    /// Two cursors (or a cursor and a container) with different owners
    /// were compared or combined.
    CrossOwnerMismatch {
        /// The operation that failed.
        op: &'static str,
        /// The owner the operation was bound to.
        expected: OwnerId,
        /// The owner of the offending cursor.
        found: OwnerId,
    },
}

impl AccessError {
    /// Shorthand for an index-based [`AccessError::OutOfRange`].
    pub fn out_of_range(op: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange {
            op,
            index,
            offset: None,
            len,
        }
    }

    /// Shorthand for [`AccessError::InvalidCursorUse`].
    pub fn misuse(op: &'static str, reason: CursorMisuse) -> Self {
        Self::InvalidCursorUse { op, reason }
    }

    /// Whether this is an [`AccessError::OutOfRange`] or an
    /// [`AccessError::ReversedSpan`].
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::ReversedSpan { .. })
    }

    /// Whether this is an [`AccessError::InvalidCursorUse`].
    pub fn is_invalid_cursor_use(&self) -> bool {
        matches!(self, Self::InvalidCursorUse { .. })
    }

    /// Whether this is an [`AccessError::CrossOwnerMismatch`].
    pub fn is_cross_owner(&self) -> bool {
        matches!(self, Self::CrossOwnerMismatch { .. })
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                op,
                index,
                offset: None,
                len,
            } => write!(f, "{op}: index {index} out of range for length {len}"),
            Self::OutOfRange {
                op,
                index,
                offset: Some(offset),
                len,
            } => write!(
                f,
                "{op}: position {index} moved by {offset} leaves range [0, {len}]"
            ),
            Self::ReversedSpan { op, first, last } => {
                write!(f, "{op}: span start {first} is past its end {last}")
            }
            Self::InvalidCursorUse { op, reason } => {
                write!(f, "{op}: invalid cursor use: {reason}")
            }
            Self::CrossOwnerMismatch {
                op,
                expected,
                found,
            } => write!(f, "{op}: cursor of {found} used with {expected}"),
        }
    }
}

impl Error for AccessError {}

/// Errors from tracked-pointer access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerError {
    /// The pointer is null: never bound, unbound, or its target was destroyed.
    NullDereference {
        /// The pointer that was dereferenced.
        pointer: PointerId,
    },
}

impl fmt::Display for PointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullDereference { pointer } => write!(f, "null dereference of {pointer}"),
        }
    }
}

impl Error for PointerError {}

/// A broken registry invariant found after an update.
///
/// Indicates a defect in the shift/invalidate algorithms rather than
/// caller misuse. Callers never receive this as a `Result`; the registry
/// panics with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inconsistency {
    /// The owner whose registry is inconsistent.
    pub owner: OwnerId,
    /// The offending record.
    pub key: CursorKey,
    /// Which invariant broke.
    pub detail: String,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "internal inconsistency in {} at {}: {}",
            self.owner, self.key, self.detail
        )
    }
}

impl Error for Inconsistency {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display_names_the_operation() {
        let e = AccessError::out_of_range("at", 9, 4);
        assert_eq!(e.to_string(), "at: index 9 out of range for length 4");
        assert!(e.is_out_of_range());
    }

    #[test]
    fn relative_jump_display_includes_offset() {
        let e = AccessError::OutOfRange {
            op: "advance",
            index: 3,
            offset: Some(5),
            len: 4,
        };
        assert_eq!(
            e.to_string(),
            "advance: position 3 moved by 5 leaves range [0, 4]"
        );
    }

    #[test]
    fn reversed_span_reports_both_ends() {
        let e = AccessError::ReversedSpan {
            op: "erase",
            first: 3,
            last: 1,
        };
        assert_eq!(e.to_string(), "erase: span start 3 is past its end 1");
        assert!(e.is_out_of_range());
    }

    #[test]
    fn misuse_classifies() {
        let e = AccessError::misuse("item", CursorMisuse::NoItem);
        assert!(e.is_invalid_cursor_use());
        assert!(!e.is_cross_owner());
        assert_eq!(e.to_string(), "item: invalid cursor use: position has no item");
    }

    #[test]
    fn null_dereference_names_pointer() {
        let pointer = PointerId::next();
        let e = PointerError::NullDereference { pointer };
        assert!(e.to_string().contains(&pointer.to_string()));
    }
}
