//! Cursor-driven iteration.

use crate::cursor::ReadCursor;

/// Iterator over clones of a [`StableVec`](crate::StableVec)'s elements.
///
/// Driven by a read cursor, so it keeps its place when the container is
/// edited between calls to `next`: elements inserted before the current
/// position are not visited, and erasing the current element ends the
/// iteration.
#[derive(Clone, Debug)]
pub struct Iter<T> {
    cursor: ReadCursor<T>,
}

impl<T> Iter<T> {
    pub(crate) fn new(cursor: ReadCursor<T>) -> Self {
        Self { cursor }
    }

    /// The cursor at the next element to yield.
    pub fn cursor(&self) -> &ReadCursor<T> {
        &self.cursor
    }
}

impl<T: Clone> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let value = self.cursor.get().ok()?;
        self.cursor.set_to_next().ok()?;
        Some(value)
    }
}
