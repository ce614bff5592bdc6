//! Change reports emitted by the storage core.
//!
//! Every size- or capacity-changing storage operation returns a
//! [`ChangeReport`]. It carries the only two facts the cursor registry needs:
//! which span was edited (and by how much), and whether the buffer moved.

use keel_core::Delta;

/// The structural part of a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Size did not change (capacity-only operations).
    None,
    /// `count` elements were inserted before position `at`.
    Inserted {
        /// First inserted index.
        at: usize,
        /// Number of elements inserted.
        count: usize,
        /// Size before the insertion.
        old_len: usize,
    },
    /// `count` elements starting at `at` were removed.
    Removed {
        /// First removed index (pre-mutation).
        at: usize,
        /// Number of elements removed.
        count: usize,
        /// Size before the removal.
        old_len: usize,
    },
    /// The tail was grown or truncated to `new_len`.
    Resized {
        /// Size before the resize.
        old_len: usize,
        /// Size after the resize.
        new_len: usize,
    },
    /// The whole content was replaced; no position mapping exists.
    Replaced {
        /// Size before the replacement.
        old_len: usize,
    },
}

/// What a storage mutation did, as reported to the cursor registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct ChangeReport {
    /// The structural edit.
    pub edit: Edit,
    /// Whether the backing buffer moved to a new address.
    pub reallocated: bool,
    /// Size after the mutation.
    pub len: usize,
    /// Buffer generation after the mutation.
    pub generation: u32,
}

impl ChangeReport {
    /// The inclusive `[first, last]` index span semantically affected,
    /// in pre-mutation indices. `None` when nothing was edited.
    pub fn affected_span(&self) -> Option<(usize, usize)> {
        match self.edit {
            Edit::None => None,
            Edit::Inserted { at, old_len, .. } => Some((at, old_len)),
            Edit::Removed { at, count, old_len } => {
                if count == 0 {
                    None
                } else {
                    Some((at, old_len))
                }
            }
            Edit::Resized { old_len, new_len } => Some((old_len.min(new_len), old_len)),
            Edit::Replaced { old_len } => Some((0, old_len)),
        }
    }

    /// Signed element-count change.
    pub fn delta(&self) -> Delta {
        match self.edit {
            Edit::None => Delta::ZERO,
            Edit::Inserted { count, .. } => Delta::Grow(count),
            Edit::Removed { count, .. } => Delta::Shrink(count),
            Edit::Resized { old_len, new_len } => Delta::between(old_len, new_len),
            Edit::Replaced { old_len } => Delta::between(old_len, self.len),
        }
    }

    /// Whether the report calls for any registry work at all.
    pub fn is_noop(&self) -> bool {
        !self.reallocated && self.affected_span().is_none() && self.delta().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(edit: Edit, len: usize) -> ChangeReport {
        ChangeReport {
            edit,
            reallocated: false,
            len,
            generation: 0,
        }
    }

    #[test]
    fn insert_span_reaches_old_end() {
        let r = report(
            Edit::Inserted {
                at: 1,
                count: 2,
                old_len: 4,
            },
            6,
        );
        assert_eq!(r.affected_span(), Some((1, 4)));
        assert_eq!(r.delta(), Delta::Grow(2));
    }

    #[test]
    fn shrinking_resize_reports_truncated_tail() {
        let r = report(
            Edit::Resized {
                old_len: 5,
                new_len: 2,
            },
            2,
        );
        assert_eq!(r.affected_span(), Some((2, 5)));
        assert_eq!(r.delta(), Delta::Shrink(3));
    }

    #[test]
    fn capacity_only_change_without_move_is_noop() {
        assert!(report(Edit::None, 3).is_noop());
        let moved = ChangeReport {
            reallocated: true,
            ..report(Edit::None, 3)
        };
        assert!(!moved.is_noop());
    }

    #[test]
    fn replaced_delta_uses_new_len() {
        let r = report(Edit::Replaced { old_len: 3 }, 8);
        assert_eq!(r.delta(), Delta::Grow(5));
    }
}
