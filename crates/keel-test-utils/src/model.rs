//! Reference model of cursor positions.
//!
//! Tracks only the array length and the expected index of each cursor,
//! using the simplest possible rule per edit. Property tests apply the
//! same random edits to a real container and to the model and compare.

use keel_core::index::check_position;
use keel_core::AccessError;

/// Handle to a cursor in a [`PositionModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelCursor(usize);

/// Expected cursor positions for a sequence of edits.
#[derive(Clone, Debug, Default)]
pub struct PositionModel {
    len: usize,
    positions: Vec<usize>,
}

impl PositionModel {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            positions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Track a cursor at `index`.
    pub fn add_cursor(&mut self, index: usize) -> Result<ModelCursor, AccessError> {
        check_position("add_cursor", index, self.len)?;
        self.positions.push(index);
        Ok(ModelCursor(self.positions.len() - 1))
    }

    /// Expected index of `cursor`.
    pub fn position(&self, cursor: ModelCursor) -> usize {
        self.positions[cursor.0]
    }

    /// Expected `has_item` of `cursor`.
    pub fn has_item(&self, cursor: ModelCursor) -> bool {
        self.position(cursor) < self.len
    }

    /// `count` elements inserted before `at`.
    pub fn insert(&mut self, at: usize, count: usize) {
        for p in &mut self.positions {
            if *p >= at {
                *p += count;
            }
        }
        self.len += count;
    }

    /// `count` elements removed starting at `at`.
    pub fn erase(&mut self, at: usize, count: usize) {
        let new_len = self.len - count;
        for p in &mut self.positions {
            if *p >= at + count {
                *p -= count;
            } else if *p >= at {
                *p = new_len;
            }
        }
        self.len = new_len;
    }

    /// Tail grown or truncated to `new_len`.
    pub fn resize(&mut self, new_len: usize) {
        let old_len = self.len;
        for p in &mut self.positions {
            if new_len < old_len && *p >= new_len {
                *p = new_len;
            } else if new_len > old_len && *p == old_len {
                *p = new_len;
            }
        }
        self.len = new_len;
    }

    /// Content replaced; every cursor at the new end.
    pub fn reset(&mut self, new_len: usize) {
        self.len = new_len;
        for p in &mut self.positions {
            *p = new_len;
        }
    }
}
