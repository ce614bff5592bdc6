//! Checked index arithmetic.
//!
//! Positions are `usize` in `[0, len]`. Element-count changes are carried as
//! a [`Delta`] (direction plus magnitude) rather than a signed integer, so a
//! shift can never wrap and can span the whole `usize` range.

use crate::error::AccessError;

/// A signed change in element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delta {
    /// Elements were added.
    Grow(usize),
    /// Elements were removed.
    Shrink(usize),
}

impl Delta {
    /// No change.
    pub const ZERO: Delta = Delta::Grow(0);

    /// The delta that takes `old` to `new`.
    pub fn between(old: usize, new: usize) -> Self {
        if new >= old {
            Delta::Grow(new - old)
        } else {
            Delta::Shrink(old - new)
        }
    }

    /// Magnitude of the change.
    pub fn magnitude(self) -> usize {
        match self {
            Delta::Grow(n) | Delta::Shrink(n) => n,
        }
    }

    /// Whether this delta changes nothing.
    pub fn is_zero(self) -> bool {
        self.magnitude() == 0
    }

    /// Apply to an index. `None` on overflow or underflow.
    pub fn apply(self, index: usize) -> Option<usize> {
        match self {
            Delta::Grow(n) => index.checked_add(n),
            Delta::Shrink(n) => index.checked_sub(n),
        }
    }

}

/// Validate a readable index: `index < len`.
pub fn check_index(op: &'static str, index: usize, len: usize) -> Result<usize, AccessError> {
    if index < len {
        Ok(index)
    } else {
        Err(AccessError::out_of_range(op, index, len))
    }
}

/// Validate a position, including the end sentinel: `pos <= len`.
pub fn check_position(op: &'static str, pos: usize, len: usize) -> Result<usize, AccessError> {
    if pos <= len {
        Ok(pos)
    } else {
        Err(AccessError::out_of_range(op, pos, len))
    }
}

/// Validate a half-open span `[first, last)` inside `[0, len]`.
pub fn check_span(
    op: &'static str,
    first: usize,
    last: usize,
    len: usize,
) -> Result<std::ops::Range<usize>, AccessError> {
    check_position(op, last, len)?;
    if first > last {
        return Err(AccessError::ReversedSpan { op, first, last });
    }
    Ok(first..last)
}

/// Move `index` by `offset`, keeping the result inside `[0, len]`.
///
/// Fails with [`AccessError::OutOfRange`] instead of clamping.
pub fn jump(op: &'static str, index: usize, offset: isize, len: usize) -> Result<usize, AccessError> {
    match index.checked_add_signed(offset) {
        Some(target) if target <= len => Ok(target),
        _ => Err(AccessError::OutOfRange {
            op,
            index,
            offset: Some(offset),
            len,
        }),
    }
}

/// Signed distance `to - from`. `None` if it does not fit an `isize`.
pub fn distance(from: usize, to: usize) -> Option<isize> {
    if to >= from {
        isize::try_from(to - from).ok()
    } else {
        isize::try_from(from - to).ok().map(|d| -d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_between_and_apply() {
        assert_eq!(Delta::between(3, 7), Delta::Grow(4));
        assert_eq!(Delta::between(7, 3), Delta::Shrink(4));
        assert_eq!(Delta::Grow(4).apply(3), Some(7));
        assert_eq!(Delta::Shrink(4).apply(3), None);
        assert!(Delta::ZERO.is_zero());
    }

    #[test]
    fn jump_rejects_instead_of_clamping() {
        assert_eq!(jump("advance", 2, 2, 4), Ok(4));
        assert!(jump("advance", 2, 3, 4).unwrap_err().is_out_of_range());
        assert!(jump("regress", 0, -1, 4).unwrap_err().is_out_of_range());
    }

    #[test]
    fn span_checks() {
        assert_eq!(check_span("erase", 1, 3, 4), Ok(1..3));
        assert_eq!(
            check_span("erase", 3, 1, 4),
            Err(AccessError::ReversedSpan {
                op: "erase",
                first: 3,
                last: 1,
            })
        );
        assert!(check_span("erase", 1, 5, 4).is_err());
    }

    #[test]
    fn index_and_position_bounds() {
        assert!(check_index("at", 4, 4).is_err());
        assert_eq!(check_position("insert", 4, 4), Ok(4));
        assert!(check_index("front", 0, 0).is_err());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn between_then_apply_round_trips(old in 0usize..10_000, new in 0usize..10_000) {
                prop_assert_eq!(Delta::between(old, new).apply(old), Some(new));
            }

            #[test]
            fn jump_stays_in_bounds(index in 0usize..100, offset in -200isize..200, len in 0usize..100) {
                let index = index.min(len);
                match jump("advance", index, offset, len) {
                    Ok(target) => {
                        prop_assert!(target <= len);
                        prop_assert_eq!(distance(index, target), Some(offset));
                    }
                    Err(e) => prop_assert!(e.is_out_of_range()),
                }
            }
        }
    }
}
