//! Floating cursors.
//!
//! A [`Cursor`] is a position into a [`StableVec`](crate::StableVec) that
//! stays correct across insertion, removal, resize and reallocation. It
//! holds a claim on the backing store, so the elements it can reach are
//! never reclaimed while it lives, and a key into the store's registry
//! where its position is kept up to date.
//!
//! The access marker selects the read/write capability at compile time:
//! `Cursor<T>` (= `Cursor<T, Mutable>`) can write through, [`ReadCursor`]
//! can only read. Both share the same position state machine.

use std::cell::{Ref, RefMut};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use keel_core::index::{distance, jump};
use keel_core::{AccessError, CursorKey, CursorMisuse, OwnerId};

use crate::record::CursorRecord;
use crate::registry::RecordKind;
use crate::store::SharedStore;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Mutable {}
    impl Sealed for super::ReadOnly {}
}

/// Access capability of a [`Cursor`].
pub trait Access: sealed::Sealed + 'static {}

/// Marker: the cursor may write through to elements.
#[derive(Debug)]
pub enum Mutable {}

/// Marker: the cursor may only read elements.
#[derive(Debug)]
pub enum ReadOnly {}

impl Access for Mutable {}
impl Access for ReadOnly {}

/// A read-only floating cursor.
pub type ReadCursor<T> = Cursor<T, ReadOnly>;

/// Anything that names a position in one container.
///
/// Implemented by both cursor kinds so positioned container operations
/// accept either.
pub trait CursorPosition {
    /// Owner of the container the position belongs to.
    fn cursor_owner(&self) -> OwnerId;

    /// Current index in `[0, len]`.
    fn cursor_index(&self) -> Result<usize, AccessError>;
}

/// Reject a position from another container.
pub(crate) fn same_owner(
    op: &'static str,
    expected: OwnerId,
    position: &impl CursorPosition,
) -> Result<usize, AccessError> {
    let found = position.cursor_owner();
    if found != expected {
        return Err(AccessError::CrossOwnerMismatch {
            op,
            expected,
            found,
        });
    }
    position.cursor_index()
}

/// A floating cursor into a [`StableVec`](crate::StableVec).
pub struct Cursor<T, A: Access = Mutable> {
    store: SharedStore<T>,
    key: CursorKey,
    _access: PhantomData<A>,
}

impl<T, A: Access> Cursor<T, A> {
    pub(crate) fn new_at(store: &SharedStore<T>, index: usize) -> Result<Self, AccessError> {
        let key = store.place(RecordKind::Floating, |len, generation| {
            CursorRecord::at(index, len, generation)
        })?;
        Ok(Self::from_key(store, key))
    }

    pub(crate) fn new_begin(store: &SharedStore<T>) -> Self {
        let record = {
            let core = store.core();
            CursorRecord::beginning(core.len(), core.generation())
        };
        Self::from_key(store, store.allocate(RecordKind::Floating, record))
    }

    pub(crate) fn new_end(store: &SharedStore<T>) -> Self {
        let record = {
            let core = store.core();
            CursorRecord::end(core.len(), core.generation())
        };
        Self::from_key(store, store.allocate(RecordKind::Floating, record))
    }

    fn from_key(store: &SharedStore<T>, key: CursorKey) -> Self {
        Self {
            store: Rc::clone(store),
            key,
            _access: PhantomData,
        }
    }

    /// Owner of the container this cursor belongs to.
    pub fn owner(&self) -> OwnerId {
        self.store.owner()
    }

    /// Copy of the backing record.
    pub fn record(&self) -> CursorRecord {
        self.store.record(RecordKind::Floating, self.key)
    }

    /// Number of claims on the backing store, including this one.
    pub fn claim_count(&self) -> usize {
        Rc::strong_count(&self.store)
    }

    /// Current index; the container length means the end sentinel.
    pub fn position(&self) -> usize {
        self.record().index
    }

    /// Whether the cursor addresses an element.
    pub fn points_to_item(&self) -> bool {
        self.record().has_item
    }

    /// Whether the cursor is at the end sentinel.
    pub fn points_to_end(&self) -> bool {
        !self.points_to_item()
    }

    /// Whether the cursor is at index 0.
    pub fn points_to_beginning(&self) -> bool {
        self.record().points_to_beginning()
    }

    /// Whether [`Cursor::set_to_next`] would succeed.
    pub fn has_next(&self) -> bool {
        self.points_to_item()
    }

    /// Alias of [`Cursor::points_to_item`].
    pub fn has_next_item_or_end_marker(&self) -> bool {
        self.points_to_item()
    }

    /// Whether [`Cursor::set_to_previous`] would succeed.
    pub fn has_previous(&self) -> bool {
        self.record().has_previous()
    }

    /// Move to index 0.
    pub fn set_to_beginning(&mut self) {
        self.with_record(|record, len| record.set_to_beginning(len));
    }

    /// Move to the end sentinel.
    pub fn set_to_end(&mut self) {
        self.with_record(|record, len| record.set_to_end(len));
    }

    /// Move to the end sentinel.
    pub fn reset(&mut self) {
        self.set_to_end();
    }

    /// Step forward. Fails at the end sentinel.
    pub fn set_to_next(&mut self) -> Result<(), AccessError> {
        self.with_record(|record, len| record.set_to_next(len))
    }

    /// Step backward. Fails at the beginning.
    pub fn set_to_previous(&mut self) -> Result<(), AccessError> {
        self.with_record(|record, len| record.set_to_previous(len))
    }

    /// Move forward by `n` (backward when negative). Fails instead of
    /// clamping when the target leaves `[0, len]`.
    pub fn advance(&mut self, n: isize) -> Result<(), AccessError> {
        self.with_record(|record, len| record.jump("advance", n, len))
    }

    /// Move backward by `n`.
    pub fn regress(&mut self, n: isize) -> Result<(), AccessError> {
        let back = n.checked_neg().ok_or_else(|| AccessError::OutOfRange {
            op: "regress",
            index: self.position(),
            offset: Some(n),
            len: self.store.len(),
        })?;
        self.with_record(|record, len| record.jump("regress", back, len))
    }

    /// Copy the position of another cursor of the same container.
    pub fn set_to_cursor(&mut self, other: &impl CursorPosition) -> Result<(), AccessError> {
        let index = same_owner("set_to_cursor", self.owner(), other)?;
        self.with_record(|record, len| record.set_position(index, len))
    }

    /// A new cursor `n` steps away from this one.
    pub fn offset(&self, n: isize) -> Result<Self, AccessError> {
        let index = jump("offset", self.position(), n, self.store.len())?;
        Self::new_at(&self.store, index)
    }

    /// Borrow the element under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the element is already mutably borrowed. Holding the
    /// returned guard across a mutation of the container also panics.
    pub fn item(&self) -> Result<Ref<'_, T>, AccessError> {
        let record = self.record();
        if !record.has_item {
            return Err(AccessError::misuse("item", CursorMisuse::NoItem));
        }
        self.store
            .item(record.index)
            .ok_or_else(|| AccessError::misuse("item", CursorMisuse::NoItem))
    }

    /// Borrow the element just before the cursor.
    pub fn previous_item(&self) -> Result<Ref<'_, T>, AccessError> {
        let record = self.record();
        if !record.has_previous() {
            return Err(AccessError::misuse(
                "previous_item",
                CursorMisuse::BeforeBeginning,
            ));
        }
        self.store
            .item(record.index - 1)
            .ok_or_else(|| AccessError::misuse("previous_item", CursorMisuse::NoItem))
    }

    /// Borrow the element `n` steps from the cursor.
    pub fn item_at(&self, n: isize) -> Result<Ref<'_, T>, AccessError> {
        let index = jump("item_at", self.position(), n, self.store.len())?;
        self.store
            .item(index)
            .ok_or_else(|| AccessError::misuse("item_at", CursorMisuse::NoItem))
    }

    /// Order relative to another cursor of the same container.
    pub fn compare(&self, other: &impl CursorPosition) -> Result<Ordering, AccessError> {
        let theirs = same_owner("compare", self.owner(), other)?;
        Ok(self.position().cmp(&theirs))
    }

    /// Signed distance `self - other` between two cursors of the same
    /// container.
    pub fn distance(&self, other: &impl CursorPosition) -> Result<isize, AccessError> {
        let theirs = same_owner("distance", self.owner(), other)?;
        let mine = self.position();
        distance(theirs, mine).ok_or(AccessError::OutOfRange {
            op: "distance",
            index: mine,
            offset: None,
            len: self.store.len(),
        })
    }

    /// A read-only cursor at the same position.
    pub fn to_read(&self) -> ReadCursor<T> {
        Cursor::from_key(&self.store, self.store.allocate(RecordKind::Floating, self.record()))
    }

    pub(crate) fn store(&self) -> &SharedStore<T> {
        &self.store
    }

    fn with_record<R>(&mut self, f: impl FnOnce(&mut CursorRecord, usize) -> R) -> R {
        self.store.with_record(RecordKind::Floating, self.key, f)
    }
}

impl<T: Clone, A: Access> Cursor<T, A> {
    /// Clone the element under the cursor.
    pub fn get(&self) -> Result<T, AccessError> {
        self.item().map(|item| item.clone())
    }
}

impl<T> Cursor<T, Mutable> {
    /// Mutably borrow the element under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the element is already borrowed.
    pub fn item_mut(&self) -> Result<RefMut<'_, T>, AccessError> {
        let record = self.record();
        if !record.has_item {
            return Err(AccessError::misuse("item_mut", CursorMisuse::NoItem));
        }
        self.store
            .item_mut(record.index)
            .ok_or_else(|| AccessError::misuse("item_mut", CursorMisuse::NoItem))
    }

    /// Overwrite the element under the cursor, returning the old value.
    pub fn set_item(&self, value: T) -> Result<T, AccessError> {
        let mut slot = self.item_mut()?;
        Ok(std::mem::replace(&mut *slot, value))
    }
}

impl<T, A: Access> CursorPosition for Cursor<T, A> {
    fn cursor_owner(&self) -> OwnerId {
        self.owner()
    }

    fn cursor_index(&self) -> Result<usize, AccessError> {
        Ok(self.position())
    }
}

impl<T, A: Access> Clone for Cursor<T, A> {
    fn clone(&self) -> Self {
        let key = self.store.allocate(RecordKind::Floating, self.record());
        Self::from_key(&self.store, key)
    }
}

impl<T, A: Access> Drop for Cursor<T, A> {
    fn drop(&mut self) {
        self.store.release(RecordKind::Floating, self.key);
    }
}

impl<T> From<Cursor<T, Mutable>> for ReadCursor<T> {
    fn from(cursor: Cursor<T, Mutable>) -> Self {
        cursor.to_read()
    }
}

impl<T, A: Access, B: Access> PartialEq<Cursor<T, B>> for Cursor<T, A> {
    fn eq(&self, other: &Cursor<T, B>) -> bool {
        self.owner() == other.owner() && self.position() == other.position()
    }
}

impl<T, A: Access, B: Access> PartialOrd<Cursor<T, B>> for Cursor<T, A> {
    fn partial_cmp(&self, other: &Cursor<T, B>) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl<T, A: Access> fmt::Debug for Cursor<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        f.debug_struct("Cursor")
            .field("owner", &self.owner())
            .field("key", &self.key)
            .field("index", &record.index)
            .field("has_item", &record.has_item)
            .finish()
    }
}
