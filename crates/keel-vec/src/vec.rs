//! The shared-ownership container facade.
//!
//! [`StableVec`] holds one claim on a store and exposes a conventional
//! container surface over it. Every mutation runs the storage operation
//! and then brings every live cursor up to date before returning.
//!
//! All operations take `&self`: the container shares its store with the
//! floating cursors created from it, which can also write through.
//!
//! # Panics
//!
//! Element guards ([`StableVec::at`], [`Cursor::item`] and friends) are
//! dynamic borrows of the store. Calling a mutating operation while such a
//! guard is alive panics with a borrow conflict instead of aliasing.

use std::cell::{Ref, RefMut};
use std::fmt;
use std::rc::Rc;

use keel_core::index::{check_position, check_span};
use keel_core::{AccessError, CursorMisuse, OwnerId};

use crate::config::VecConfig;
use crate::cursor::{same_owner, Access, Cursor, CursorPosition, ReadCursor};
use crate::direct::DirectCursor;
use crate::iter::Iter;
use crate::record::CursorRecord;
use crate::store::{SharedStore, Store};

/// A dynamic array whose cursors survive structural mutation.
pub struct StableVec<T> {
    store: SharedStore<T>,
}

impl<T> StableVec<T> {
    /// Create an empty container with the default configuration.
    pub fn new() -> Self {
        Self::with_config(VecConfig::default())
    }

    /// Create an empty container from `config`.
    pub fn with_config(config: VecConfig) -> Self {
        Self::from_vec_with_config(Vec::new(), config)
    }

    /// Adopt `data` under `config`.
    pub fn from_vec_with_config(data: Vec<T>, config: VecConfig) -> Self {
        Self {
            store: Store::new(data, &config),
        }
    }

    /// Identity of this container, shared by all its cursors.
    pub fn owner(&self) -> OwnerId {
        self.store.owner()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated capacity in elements.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Claims on the store: this container plus every live floating cursor.
    pub fn claim_count(&self) -> usize {
        Rc::strong_count(&self.store)
    }

    /// Live cursor records, floating and direct.
    pub fn cursor_count(&self) -> usize {
        self.store.registry().len()
    }

    /// Live direct cursor records.
    pub fn direct_cursor_count(&self) -> usize {
        self.store.registry().direct_len()
    }

    pub(crate) fn store(&self) -> &SharedStore<T> {
        &self.store
    }

    fn config(&self) -> VecConfig {
        VecConfig::new().with_verify_records(self.store.verifies())
    }

    // Element access.

    /// Borrow the element at `index`.
    pub fn at(&self, index: usize) -> Result<Ref<'_, T>, AccessError> {
        let len = self.len();
        self.store
            .item(index)
            .ok_or(AccessError::out_of_range("at", index, len))
    }

    /// Mutably borrow the element at `index`.
    pub fn at_mut(&self, index: usize) -> Result<RefMut<'_, T>, AccessError> {
        let len = self.len();
        self.store
            .item_mut(index)
            .ok_or(AccessError::out_of_range("at_mut", index, len))
    }

    /// Overwrite the element at `index`, returning the old value.
    pub fn set(&self, index: usize, value: T) -> Result<T, AccessError> {
        let mut slot = self.at_mut(index)?;
        Ok(std::mem::replace(&mut *slot, value))
    }

    /// Borrow the first element.
    pub fn front(&self) -> Result<Ref<'_, T>, AccessError> {
        self.store
            .item(0)
            .ok_or(AccessError::out_of_range("front", 0, 0))
    }

    /// Borrow the last element.
    pub fn back(&self) -> Result<Ref<'_, T>, AccessError> {
        let len = self.len();
        let last = len
            .checked_sub(1)
            .ok_or(AccessError::out_of_range("back", 0, 0))?;
        self.store
            .item(last)
            .ok_or(AccessError::out_of_range("back", last, len))
    }

    // Structural mutation.

    /// Append an element.
    pub fn push_back(&self, value: T) {
        let report = self.store.core_mut().push(value);
        self.store.commit(&report);
    }

    /// Remove and return the last element.
    pub fn pop_back(&self) -> Result<T, AccessError> {
        self.store.mutate(|core| core.pop())
    }

    /// Insert `value` before position `index`.
    pub fn insert(&self, index: usize, value: T) -> Result<(), AccessError> {
        self.store
            .mutate(|core| Ok(((), core.insert(index, value)?)))
    }

    /// Insert every value of `values` before position `index`.
    ///
    /// The values are collected before the container is touched.
    pub fn insert_iter<I>(&self, index: usize, values: I) -> Result<(), AccessError>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        self.store
            .mutate(|core| Ok(((), core.insert_iter(index, values)?)))
    }

    /// Remove and return the element at `index`.
    pub fn erase_at(&self, index: usize) -> Result<T, AccessError> {
        self.store.mutate(|core| core.remove(index))
    }

    /// Remove the half-open span `[first, last)`.
    ///
    /// `first` must address an element.
    pub fn erase_range(&self, first: usize, last: usize) -> Result<(), AccessError> {
        let removed = self.store.mutate(|core| core.remove_range(first, last))?;
        drop(removed);
        Ok(())
    }

    /// Grow with values from `fill`, or truncate, to `new_len`.
    ///
    /// # Panics
    ///
    /// Panics if `fill` accesses this container.
    pub fn resize_with<F>(&self, new_len: usize, fill: F)
    where
        F: FnMut() -> T,
    {
        let (removed, report) = self.store.core_mut().resize_with(new_len, fill);
        self.store.commit(&report);
        drop(removed);
    }

    /// Ensure capacity for at least `min_capacity` elements in total.
    pub fn reserve(&self, min_capacity: usize) {
        let report = self.store.core_mut().reserve(min_capacity);
        self.store.commit(&report);
    }

    /// Release unused capacity.
    pub fn shrink_to_fit(&self) {
        let report = self.store.core_mut().shrink_to_fit();
        self.store.commit(&report);
    }

    /// Remove every element. Every cursor moves to the end sentinel.
    pub fn clear(&self) {
        let (removed, report) = self.store.core_mut().clear();
        self.store.commit(&report);
        drop(removed);
    }

    /// Replace the content with `values`. Every cursor moves to the end
    /// sentinel.
    pub fn assign<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        let (removed, report) = self.store.core_mut().assign(values);
        self.store.commit(&report);
        drop(removed);
    }

    /// Exchange contents with `other`. Cursors stay with their container
    /// and move to its end sentinel.
    pub fn swap_contents(&self, other: &StableVec<T>) {
        if Rc::ptr_eq(&self.store, &other.store) {
            return;
        }
        let (mine, theirs) = self
            .store
            .core_mut()
            .swap(&mut other.store.core_mut());
        self.store.commit(&mine);
        other.store.commit(&theirs);
    }

    // Cursor factories.

    /// A cursor at index 0.
    pub fn begin(&self) -> Cursor<T> {
        Cursor::new_begin(&self.store)
    }

    /// A cursor at the end sentinel.
    pub fn end(&self) -> Cursor<T> {
        Cursor::new_end(&self.store)
    }

    /// A read-only cursor at index 0.
    pub fn read_begin(&self) -> ReadCursor<T> {
        Cursor::new_begin(&self.store)
    }

    /// A read-only cursor at the end sentinel.
    pub fn read_end(&self) -> ReadCursor<T> {
        Cursor::new_end(&self.store)
    }

    /// A cursor at `index`, which may be the end sentinel.
    pub fn cursor_at(&self, index: usize) -> Result<Cursor<T>, AccessError> {
        Cursor::new_at(&self.store, index)
    }

    /// A direct cursor at index 0.
    pub fn direct_begin(&self) -> DirectCursor<T> {
        let record = {
            let core = self.store.core();
            CursorRecord::beginning(core.len(), core.generation())
        };
        DirectCursor::new(&self.store, record)
    }

    /// A direct cursor at the end sentinel.
    pub fn direct_end(&self) -> DirectCursor<T> {
        let record = {
            let core = self.store.core();
            CursorRecord::end(core.len(), core.generation())
        };
        DirectCursor::new(&self.store, record)
    }

    // Cursor-positioned editing.

    fn position_of(&self, op: &'static str, pos: &impl CursorPosition) -> Result<usize, AccessError> {
        same_owner(op, self.owner(), pos)
    }

    /// Insert `value` before `pos`; returns a cursor at the new element.
    pub fn insert_before(
        &self,
        pos: &impl CursorPosition,
        value: T,
    ) -> Result<Cursor<T>, AccessError> {
        let at = self.position_of("insert_before", pos)?;
        self.insert(at, value)?;
        self.cursor_at(at)
    }

    /// Insert `values` before `pos`; returns a cursor at the first new
    /// element (or at `pos` when nothing was inserted).
    pub fn insert_iter_before<I>(
        &self,
        pos: &impl CursorPosition,
        values: I,
    ) -> Result<Cursor<T>, AccessError>
    where
        I: IntoIterator<Item = T>,
    {
        let at = self.position_of("insert_iter_before", pos)?;
        self.insert_iter(at, values)?;
        self.cursor_at(at)
    }

    /// Remove and return the element under `pos`.
    ///
    /// Fails with [`AccessError::OutOfRange`] at the end sentinel.
    pub fn erase(&self, pos: &impl CursorPosition) -> Result<T, AccessError> {
        let at = self.position_of("erase", pos)?;
        self.erase_at(at)
    }

    /// Remove the span from `first` up to, not including, `last`.
    pub fn erase_between(
        &self,
        first: &impl CursorPosition,
        last: &impl CursorPosition,
    ) -> Result<(), AccessError> {
        let from = self.position_of("erase_between", first)?;
        let to = self.position_of("erase_between", last)?;
        self.erase_range(from, to)
    }

    /// Remove the span from `first` through `last`; `last` must address
    /// an element.
    pub fn erase_inclusive(
        &self,
        first: &impl CursorPosition,
        last: &impl CursorPosition,
    ) -> Result<(), AccessError> {
        let from = self.position_of("erase_inclusive", first)?;
        let through = self.position_of("erase_inclusive", last)?;
        if through >= self.len() {
            return Err(AccessError::misuse("erase_inclusive", CursorMisuse::NoItem));
        }
        self.erase_range(from, through + 1)
    }

    /// Remove and return the element just before `pos`.
    pub fn erase_previous_item(&self, pos: &impl CursorPosition) -> Result<T, AccessError> {
        let at = self.position_of("erase_previous_item", pos)?;
        let previous = at.checked_sub(1).ok_or(AccessError::misuse(
            "erase_previous_item",
            CursorMisuse::BeforeBeginning,
        ))?;
        self.erase_at(previous)
    }
}

impl<T: Clone> StableVec<T> {
    /// Insert `count` copies of `value` before position `index`.
    pub fn insert_n(&self, index: usize, count: usize, value: T) -> Result<(), AccessError> {
        self.store
            .mutate(|core| Ok(((), core.insert_n(index, count, value)?)))
    }

    /// Insert `count` copies of `value` before `pos`; returns a cursor at
    /// the first new element.
    pub fn insert_n_before(
        &self,
        pos: &impl CursorPosition,
        count: usize,
        value: T,
    ) -> Result<Cursor<T>, AccessError> {
        let at = self.position_of("insert_n_before", pos)?;
        self.insert_n(at, count, value)?;
        self.cursor_at(at)
    }

    /// Grow with copies of `value`, or truncate, to `new_len`.
    pub fn resize(&self, new_len: usize, value: T) {
        let (removed, report) = self.store.core_mut().resize(new_len, value);
        self.store.commit(&report);
        drop(removed);
    }

    /// Replace the content with `count` copies of `value`.
    pub fn assign_n(&self, count: usize, value: T) {
        self.assign(std::iter::repeat_n(value, count));
    }

    /// Replace the content with a copy of `other`'s. Assigning a container
    /// to itself changes nothing.
    pub fn assign_from(&self, other: &StableVec<T>) {
        if Rc::ptr_eq(&self.store, &other.store) {
            return;
        }
        self.assign(other.to_vec());
    }

    /// Replace the content with copies of the span `[start, end)` of the
    /// container both cursors belong to.
    pub fn assign_from_range<A: Access, B: Access>(
        &self,
        start: &Cursor<T, A>,
        end: &Cursor<T, B>,
    ) -> Result<(), AccessError> {
        let values = copy_span("assign_from_range", start, end, false)?;
        self.assign(values);
        Ok(())
    }

    /// Replace the content with copies of the span `[first, last]`; `last`
    /// must address an element.
    pub fn assign_inclusive<A: Access, B: Access>(
        &self,
        first: &Cursor<T, A>,
        last: &Cursor<T, B>,
    ) -> Result<(), AccessError> {
        let values = copy_span("assign_inclusive", first, last, true)?;
        self.assign(values);
        Ok(())
    }

    /// A new container holding copies of the span `[start, end)`.
    pub fn from_cursor_range<A: Access, B: Access>(
        start: &Cursor<T, A>,
        end: &Cursor<T, B>,
    ) -> Result<Self, AccessError> {
        copy_span("from_cursor_range", start, end, false).map(Self::from)
    }

    /// Copy the elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.store.core().as_slice().to_vec()
    }

    /// Iterate over clones of the elements.
    pub fn iter(&self) -> Iter<T> {
        Iter::new(self.read_begin())
    }
}

impl<T: Default> StableVec<T> {
    /// Grow with default values, or truncate, to `new_len`.
    pub fn resize_default(&self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }
}

fn copy_span<T: Clone, A: Access, B: Access>(
    op: &'static str,
    start: &Cursor<T, A>,
    end: &Cursor<T, B>,
    inclusive: bool,
) -> Result<Vec<T>, AccessError> {
    let last = same_owner(op, start.owner(), end)?;
    let first = start.position();
    let core = start.store().core();
    let last = if inclusive {
        if last >= core.len() {
            return Err(AccessError::misuse(op, CursorMisuse::NoItem));
        }
        last + 1
    } else {
        check_position(op, last, core.len())?
    };
    let span = check_span(op, first, last, core.len())?;
    Ok(core.as_slice()[span].to_vec())
}

impl<T> Default for StableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for StableVec<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec_with_config(data, VecConfig::default())
    }
}

impl<T> FromIterator<T> for StableVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: Clone> Clone for StableVec<T> {
    /// Deep copy into a new owner with no cursors.
    fn clone(&self) -> Self {
        Self::from_vec_with_config(self.to_vec(), self.config())
    }
}

impl<'a, T: Clone> IntoIterator for &'a StableVec<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for StableVec<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
            || self.store.core().as_slice() == other.store.core().as_slice()
    }
}

impl<T: Eq> Eq for StableVec<T> {}

impl<T: fmt::Debug> fmt::Debug for StableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.store.core().as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn v(values: &[i32]) -> StableVec<i32> {
        StableVec::from(values.to_vec())
    }

    #[test]
    fn basic_container_surface() {
        let x = StableVec::new();
        assert!(x.is_empty());
        x.push_back(1);
        x.push_back(2);
        x.insert(1, 9).unwrap();
        assert_eq!(x.to_vec(), vec![1, 9, 2]);
        assert_eq!(*x.front().unwrap(), 1);
        assert_eq!(*x.back().unwrap(), 2);
        assert_eq!(x.set(1, 5).unwrap(), 9);
        *x.at_mut(2).unwrap() = 7;
        assert_eq!(x.pop_back().unwrap(), 7);
        assert_eq!(x.erase_at(0).unwrap(), 1);
        assert_eq!(x.to_vec(), vec![5]);
    }

    #[test]
    fn empty_access_is_out_of_range() {
        let x = StableVec::<u8>::new();
        assert!(x.front().unwrap_err().is_out_of_range());
        assert!(x.back().unwrap_err().is_out_of_range());
        assert!(x.pop_back().unwrap_err().is_out_of_range());
        assert!(x.erase_at(0).unwrap_err().is_out_of_range());
        assert!(x.at(0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn insert_shifts_cursors_at_and_after() {
        let x = v(&[1, 2, 3]);
        let first = x.begin();
        let second = x.cursor_at(1).unwrap();
        let end = x.end();
        x.insert_n(1, 2, 0).unwrap();
        assert_eq!(first.position(), 0);
        assert_eq!(second.position(), 3);
        assert_eq!(second.get().unwrap(), 2);
        assert_eq!(end.position(), 5);
        assert!(end.points_to_end());
    }

    #[test]
    fn erase_range_invalidates_span() {
        let x = v(&[1, 2, 3, 4, 5]);
        let inside = x.cursor_at(2).unwrap();
        let after = x.cursor_at(4).unwrap();
        x.erase_range(1, 3).unwrap();
        assert!(inside.points_to_end());
        assert_eq!(inside.position(), 3);
        assert_eq!(after.get().unwrap(), 5);
        assert_eq!(after.position(), 2);
    }

    #[test]
    fn empty_erase_range_leaves_cursors_in_place() {
        let x = v(&[1, 2, 3]);
        let at = x.cursor_at(1).unwrap();
        let end = x.end();
        x.erase_range(1, 1).unwrap();
        assert_eq!(x.to_vec(), vec![1, 2, 3]);
        assert_eq!(at.position(), 1);
        assert_eq!(at.get().unwrap(), 2);
        assert_eq!(end.position(), 3);
        assert!(end.points_to_end());
        assert!(x.erase_range(3, 3).unwrap_err().is_out_of_range());
    }

    /// Panics on the third clone made through any handle sharing `clones`.
    #[derive(Debug)]
    struct FlakyClone {
        id: u32,
        clones: Rc<std::cell::Cell<u32>>,
    }

    impl FlakyClone {
        fn new(id: u32, clones: &Rc<std::cell::Cell<u32>>) -> Self {
            Self {
                id,
                clones: Rc::clone(clones),
            }
        }
    }

    impl Clone for FlakyClone {
        fn clone(&self) -> Self {
            let made = self.clones.get() + 1;
            self.clones.set(made);
            assert!(made < 3, "clone {made} failed");
            Self::new(self.id, &self.clones)
        }
    }

    #[test]
    fn panicking_clone_during_resize_keeps_cursors_consistent() {
        let clones = Rc::new(std::cell::Cell::new(0));
        let x = StableVec::from(vec![FlakyClone::new(0, &clones)]);
        let end = x.end();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            x.resize(10, FlakyClone::new(9, &clones));
        }));
        assert!(outcome.is_err());
        assert_eq!(x.len(), 1);
        assert_eq!(end.position(), 1);
        assert!(end.points_to_end());

        x.push_back(FlakyClone::new(1, &clones));
        assert_eq!(end.position(), 2);
        assert!(end.points_to_end());
    }

    #[test]
    fn panicking_clone_during_insert_n_keeps_cursors_consistent() {
        let clones = Rc::new(std::cell::Cell::new(0));
        let x = StableVec::from(vec![FlakyClone::new(0, &clones), FlakyClone::new(1, &clones)]);
        let second = x.cursor_at(1).unwrap();
        let end = x.end();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            x.insert_n(0, 5, FlakyClone::new(9, &clones)).unwrap();
        }));
        assert!(outcome.is_err());
        assert_eq!(x.len(), 2);
        assert_eq!(second.item().unwrap().id, 1);
        assert_eq!(end.position(), 2);
        assert!(end.points_to_end());
    }

    #[test]
    fn resize_truncates_and_grows() {
        let x = v(&[1, 2, 3, 4]);
        let cut = x.cursor_at(3).unwrap();
        let end = x.end();
        x.resize(2, 0);
        assert!(cut.points_to_end());
        assert_eq!(end.position(), 2);
        x.resize_default(4);
        assert_eq!(x.to_vec(), vec![1, 2, 0, 0]);
        assert_eq!(end.position(), 4);
        assert_eq!(cut.position(), 4);
    }

    #[test]
    fn reallocation_keeps_logical_index() {
        let x = StableVec::with_config(VecConfig::new().with_verify_records(true));
        x.push_back(1u64);
        let c = x.begin();
        let generation = c.record().generation;
        x.reserve(4096);
        assert!(x.capacity() >= 4096);
        assert_eq!(c.position(), 0);
        assert!(c.record().generation > generation);
        assert_eq!(c.get().unwrap(), 1);
        x.shrink_to_fit();
        assert_eq!(c.get().unwrap(), 1);
    }

    #[test]
    fn bulk_replacement_resets_cursors() {
        let x = v(&[1, 2, 3]);
        let c = x.begin();
        x.assign([7, 8]);
        assert!(c.points_to_end());
        assert_eq!(c.position(), 2);
        x.assign_n(4, 1);
        assert_eq!(c.position(), 4);
        x.clear();
        assert_eq!(c.position(), 0);
        assert!(x.is_empty());
    }

    #[test]
    fn assign_from_self_is_noop() {
        let x = v(&[1, 2]);
        let c = x.begin();
        x.assign_from(&x);
        assert_eq!(c.position(), 0);
        let y = v(&[5]);
        x.assign_from(&y);
        assert_eq!(x.to_vec(), vec![5]);
        assert!(c.points_to_end());
    }

    #[test]
    fn swap_contents_keeps_cursors_home() {
        let x = v(&[1, 2, 3]);
        let y = v(&[4]);
        let cx = x.begin();
        let cy = y.begin();
        x.swap_contents(&y);
        assert_eq!(x.to_vec(), vec![4]);
        assert_eq!(y.to_vec(), vec![1, 2, 3]);
        assert_eq!(cx.owner(), x.owner());
        assert_eq!(cx.position(), 1);
        assert_eq!(cy.position(), 3);
        x.swap_contents(&x);
    }

    #[test]
    fn positioned_insert_returns_cursor_at_new_element() {
        let x = v(&[1, 3]);
        let at_three = x.cursor_at(1).unwrap();
        let new = x.insert_before(&at_three, 2).unwrap();
        assert_eq!(new.get().unwrap(), 2);
        assert_eq!(at_three.get().unwrap(), 3);
        let more = x.insert_n_before(&x.end(), 2, 4).unwrap();
        assert_eq!(more.position(), 3);
        let front = x.insert_iter_before(&x.begin(), [0]).unwrap();
        assert_eq!(front.get().unwrap(), 0);
        assert_eq!(x.to_vec(), vec![0, 1, 2, 3, 4, 4]);
    }

    #[test]
    fn positioned_erase_variants() {
        let x = v(&[1, 2, 3, 4, 5, 6]);
        let end = x.end();
        assert!(x.erase(&end).unwrap_err().is_out_of_range());
        assert_eq!(x.erase_previous_item(&end).unwrap(), 6);
        assert!(x
            .erase_previous_item(&x.begin())
            .unwrap_err()
            .is_invalid_cursor_use());
        let second = x.cursor_at(1).unwrap();
        let fourth = x.cursor_at(3).unwrap();
        x.erase_between(&second, &fourth).unwrap();
        assert_eq!(x.to_vec(), vec![1, 4, 5]);
        assert!(x
            .erase_inclusive(&x.begin(), &x.end())
            .unwrap_err()
            .is_invalid_cursor_use());
        x.erase_inclusive(&x.begin(), &x.cursor_at(1).unwrap())
            .unwrap();
        assert_eq!(x.to_vec(), vec![5]);
    }

    #[test]
    fn positioned_ops_reject_foreign_cursors() {
        let x = v(&[1]);
        let y = v(&[1]);
        let foreign = y.begin();
        assert!(x.insert_before(&foreign, 0).unwrap_err().is_cross_owner());
        assert!(x.erase(&foreign).unwrap_err().is_cross_owner());
        assert!(x
            .erase_between(&x.begin(), &foreign)
            .unwrap_err()
            .is_cross_owner());
        assert!(x
            .erase_previous_item(&y.direct_end())
            .unwrap_err()
            .is_cross_owner());
    }

    #[test]
    fn range_assignment_from_cursors() {
        let src = v(&[1, 2, 3, 4]);
        let x = v(&[9]);
        let start = src.cursor_at(1).unwrap();
        let stop = src.read_end();
        x.assign_from_range(&start, &stop).unwrap();
        assert_eq!(x.to_vec(), vec![2, 3, 4]);
        let last = src.cursor_at(2).unwrap();
        x.assign_inclusive(&src.begin(), &last).unwrap();
        assert_eq!(x.to_vec(), vec![1, 2, 3]);
        assert!(x
            .assign_inclusive(&start, &stop)
            .unwrap_err()
            .is_invalid_cursor_use());
        assert!(x
            .assign_from_range(&stop, &start)
            .unwrap_err()
            .is_out_of_range());
        let made = StableVec::from_cursor_range(&start, &last).unwrap();
        assert_eq!(made.to_vec(), vec![2]);
    }

    #[test]
    fn range_assignment_rejects_mixed_owners() {
        let a = v(&[1, 2]);
        let b = v(&[3, 4]);
        let x = StableVec::new();
        let err = x.assign_from_range(&a.begin(), &b.end()).unwrap_err();
        assert!(err.is_cross_owner());
    }

    #[test]
    fn range_assignment_from_own_cursors() {
        let x = v(&[1, 2, 3]);
        let start = x.cursor_at(1).unwrap();
        x.assign_from_range(&start, &x.end()).unwrap();
        assert_eq!(x.to_vec(), vec![2, 3]);
    }

    #[test]
    fn clone_is_deep_with_new_owner() {
        let x = v(&[1, 2]);
        let _c = x.begin();
        let y = x.clone();
        assert_eq!(x, y);
        assert_ne!(x.owner(), y.owner());
        assert_eq!(y.cursor_count(), 0);
        y.push_back(3);
        assert_ne!(x, y);
    }

    #[test]
    fn claims_count_floating_cursors_only() {
        let x = v(&[1]);
        let a = x.begin();
        let _d = x.direct_begin();
        assert_eq!(x.claim_count(), 2);
        assert_eq!(x.cursor_count(), 2);
        drop(a);
        assert_eq!(x.claim_count(), 1);
    }

    #[test]
    fn debug_lists_elements() {
        assert_eq!(format!("{:?}", v(&[1, 2])), "[1, 2]");
    }

    #[test]
    #[should_panic]
    fn mutation_under_element_guard_panics() {
        let x = v(&[1]);
        let _guard = x.at(0).unwrap();
        x.push_back(2);
    }

    #[test]
    #[traced_test]
    fn reallocation_and_reset_are_logged() {
        let x = StableVec::from(vec![1u8]);
        let _c = x.begin();
        x.reserve(1024);
        x.clear();
        assert!(logs_contain("buffer moved, cursor records resynced"));
        assert!(logs_contain("cursor records reset"));
    }
}
