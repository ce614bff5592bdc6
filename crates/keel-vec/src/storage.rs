//! The storage core: a contiguous growable buffer that reports its changes.
//!
//! [`StorageCore`] wraps a `Vec<T>` and has no notion of cursors. Every
//! size- or capacity-changing operation returns a [`ChangeReport`] for the
//! caller to forward to the registry. Operations that remove elements hand
//! the removed values back instead of dropping them, so the caller can
//! drop them after every borrow of the store has ended.
//!
//! Caller-supplied code (iterators, fill closures, `Clone`) runs to
//! completion before the buffer is touched. A panic there leaves the core
//! exactly as it was, with no report owed to the registry.
//!
//! Reallocation is detected by comparing the buffer address before and
//! after the operation. Each move bumps the buffer generation, which
//! cursor records cache as their resolved position.

use keel_core::index::{check_index, check_position, check_span};
use keel_core::AccessError;

use crate::report::{ChangeReport, Edit};

/// A contiguous growable buffer of elements.
pub struct StorageCore<T> {
    /// Backing storage.
    data: Vec<T>,
    /// Incremented each time the buffer moves.
    generation: u32,
}

impl<T> StorageCore<T> {
    /// Create an empty core without allocating.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create an empty core with at least `capacity` reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    /// Adopt an existing buffer.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data,
            generation: 0,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocated capacity in elements.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Current buffer generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// All elements in order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<&T, AccessError> {
        let len = self.data.len();
        self.data
            .get(index)
            .ok_or_else(|| AccessError::out_of_range("get", index, len))
    }

    /// Write access to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, AccessError> {
        let len = self.data.len();
        self.data
            .get_mut(index)
            .ok_or_else(|| AccessError::out_of_range("get_mut", index, len))
    }

    /// Append one element.
    pub fn push(&mut self, value: T) -> ChangeReport {
        let before = self.mark();
        let old_len = self.data.len();
        self.data.push(value);
        self.finish(
            before,
            Edit::Inserted {
                at: old_len,
                count: 1,
                old_len,
            },
        )
    }

    /// Remove the last element.
    pub fn pop(&mut self) -> Result<(T, ChangeReport), AccessError> {
        let before = self.mark();
        let old_len = self.data.len();
        let value = self
            .data
            .pop()
            .ok_or_else(|| AccessError::out_of_range("pop_back", 0, 0))?;
        let report = self.finish(
            before,
            Edit::Removed {
                at: old_len - 1,
                count: 1,
                old_len,
            },
        );
        Ok((value, report))
    }

    /// Insert one element before position `at` (`at == len` appends).
    pub fn insert(&mut self, at: usize, value: T) -> Result<ChangeReport, AccessError> {
        let old_len = self.data.len();
        check_position("insert", at, old_len)?;
        let before = self.mark();
        self.data.insert(at, value);
        Ok(self.finish(
            before,
            Edit::Inserted {
                at,
                count: 1,
                old_len,
            },
        ))
    }

    /// Insert every value yielded by `values` before position `at`.
    pub fn insert_iter<I>(&mut self, at: usize, values: I) -> Result<ChangeReport, AccessError>
    where
        I: IntoIterator<Item = T>,
    {
        let old_len = self.data.len();
        check_position("insert", at, old_len)?;
        let values: Vec<T> = values.into_iter().collect();
        let count = values.len();
        let before = self.mark();
        drop(self.data.splice(at..at, values));
        Ok(self.finish(before, Edit::Inserted { at, count, old_len }))
    }

    /// Remove the element at `at`.
    pub fn remove(&mut self, at: usize) -> Result<(T, ChangeReport), AccessError> {
        let old_len = self.data.len();
        check_index("erase", at, old_len)?;
        let before = self.mark();
        let value = self.data.remove(at);
        let report = self.finish(
            before,
            Edit::Removed {
                at,
                count: 1,
                old_len,
            },
        );
        Ok((value, report))
    }

    /// Remove the half-open span `[first, last)`.
    ///
    /// `first` must address an element; an empty span elsewhere is allowed
    /// and removes nothing.
    pub fn remove_range(
        &mut self,
        first: usize,
        last: usize,
    ) -> Result<(Vec<T>, ChangeReport), AccessError> {
        let old_len = self.data.len();
        let span = check_span("erase", first, last, old_len)?;
        check_index("erase", first, old_len)?;
        let before = self.mark();
        let removed: Vec<T> = self.data.drain(span).collect();
        let count = removed.len();
        let report = self.finish(
            before,
            Edit::Removed {
                at: first,
                count,
                old_len,
            },
        );
        Ok((removed, report))
    }

    /// Grow with values from `fill`, or truncate, to `new_len`.
    pub fn resize_with<F>(&mut self, new_len: usize, fill: F) -> (Vec<T>, ChangeReport)
    where
        F: FnMut() -> T,
    {
        let old_len = self.data.len();
        let extra: Vec<T> = std::iter::repeat_with(fill)
            .take(new_len.saturating_sub(old_len))
            .collect();
        let before = self.mark();
        let removed = if new_len < old_len {
            self.data.split_off(new_len)
        } else {
            self.data.extend(extra);
            Vec::new()
        };
        let report = self.finish(before, Edit::Resized { old_len, new_len });
        (removed, report)
    }

    /// Ensure capacity for at least `min_capacity` elements in total.
    pub fn reserve(&mut self, min_capacity: usize) -> ChangeReport {
        let before = self.mark();
        if min_capacity > self.data.capacity() {
            self.data.reserve(min_capacity - self.data.len());
        }
        self.finish(before, Edit::None)
    }

    /// Release unused capacity.
    pub fn shrink_to_fit(&mut self) -> ChangeReport {
        let before = self.mark();
        self.data.shrink_to_fit();
        self.finish(before, Edit::None)
    }

    /// Remove every element, keeping the buffer.
    pub fn clear(&mut self) -> (Vec<T>, ChangeReport) {
        let old_len = self.data.len();
        let before = self.mark();
        let removed: Vec<T> = self.data.drain(..).collect();
        let report = self.finish(before, Edit::Replaced { old_len });
        (removed, report)
    }

    /// Replace the whole content with `values`, reusing the buffer where
    /// it is large enough.
    pub fn assign<I>(&mut self, values: I) -> (Vec<T>, ChangeReport)
    where
        I: IntoIterator<Item = T>,
    {
        let old_len = self.data.len();
        let before = self.mark();
        let removed: Vec<T> = self.data.drain(..).collect();
        self.data.extend(values);
        let report = self.finish(before, Edit::Replaced { old_len });
        (removed, report)
    }

    /// Exchange buffers with `other`. Both sides lose any position mapping.
    pub fn swap(&mut self, other: &mut StorageCore<T>) -> (ChangeReport, ChangeReport) {
        let before_self = self.mark();
        let before_other = other.mark();
        let (len_self, len_other) = (self.data.len(), other.data.len());
        std::mem::swap(&mut self.data, &mut other.data);
        let mine = self.finish(before_self, Edit::Replaced { old_len: len_self });
        let theirs = other.finish(before_other, Edit::Replaced { old_len: len_other });
        (mine, theirs)
    }

    fn mark(&self) -> usize {
        self.data.as_ptr() as usize
    }

    fn finish(&mut self, before: usize, edit: Edit) -> ChangeReport {
        let reallocated = self.mark() != before;
        if reallocated {
            self.generation = self.generation.wrapping_add(1);
        }
        ChangeReport {
            edit,
            reallocated,
            len: self.data.len(),
            generation: self.generation,
        }
    }
}

impl<T: Clone> StorageCore<T> {
    /// Insert `count` copies of `value` before position `at`.
    pub fn insert_n(&mut self, at: usize, count: usize, value: T) -> Result<ChangeReport, AccessError> {
        self.insert_iter(at, std::iter::repeat_n(value, count))
    }

    /// Grow with copies of `value`, or truncate, to `new_len`.
    pub fn resize(&mut self, new_len: usize, value: T) -> (Vec<T>, ChangeReport) {
        self.resize_with(new_len, || value.clone())
    }
}

impl<T> Default for StorageCore<T> {
    fn default() -> Self {
        Self::new()
    }
}
