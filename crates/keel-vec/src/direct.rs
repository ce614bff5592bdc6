//! Direct cursors.
//!
//! A [`DirectCursor`] tracks a position exactly like a floating cursor but
//! does not claim the store: it holds a weak reference, and its record
//! lives in the registry's inline list. Once the container and every
//! floating cursor are gone, each operation on a direct cursor fails with
//! [`CursorMisuse::StoreReclaimed`].
//!
//! Since the store may disappear between calls, element access goes
//! through closures ([`DirectCursor::with`], [`DirectCursor::with_mut`])
//! or clones ([`DirectCursor::get`]); [`DirectCursor::item_in`] borrows
//! through a container the caller already holds.

use std::cell::Ref;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use keel_core::index::distance;
use keel_core::{AccessError, CursorKey, CursorMisuse, OwnerId};

use crate::cursor::{same_owner, CursorPosition};
use crate::record::CursorRecord;
use crate::registry::RecordKind;
use crate::store::{SharedStore, Store};
use crate::vec::StableVec;

/// A non-owning cursor into a [`StableVec`].
pub struct DirectCursor<T> {
    store: Weak<Store<T>>,
    owner: OwnerId,
    key: CursorKey,
}

impl<T> DirectCursor<T> {
    pub(crate) fn new(store: &SharedStore<T>, record: CursorRecord) -> Self {
        Self {
            store: Rc::downgrade(store),
            owner: store.owner(),
            key: store.allocate(RecordKind::Direct, record),
        }
    }

    fn store(&self, op: &'static str) -> Result<SharedStore<T>, AccessError> {
        self.store
            .upgrade()
            .ok_or(AccessError::misuse(op, CursorMisuse::StoreReclaimed))
    }

    fn read<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&CursorRecord) -> R,
    ) -> Result<R, AccessError> {
        let store = self.store(op)?;
        Ok(f(&store.record(RecordKind::Direct, self.key)))
    }

    fn update<R>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut CursorRecord, usize) -> Result<R, AccessError>,
    ) -> Result<R, AccessError> {
        let store = self.store(op)?;
        store.with_record(RecordKind::Direct, self.key, f)
    }

    /// Owner of the container this cursor was created from.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Whether the backing store has been reclaimed.
    pub fn is_reclaimed(&self) -> bool {
        self.store.strong_count() == 0
    }

    /// Copy of the backing record.
    pub fn record(&self) -> Result<CursorRecord, AccessError> {
        self.read("record", |record| *record)
    }

    /// Current index.
    pub fn position(&self) -> Result<usize, AccessError> {
        self.read("position", |record| record.index)
    }

    /// Whether the cursor addresses an element.
    pub fn points_to_item(&self) -> Result<bool, AccessError> {
        self.read("points_to_item", |record| record.has_item)
    }

    /// Whether the cursor is at the end sentinel.
    pub fn points_to_end(&self) -> Result<bool, AccessError> {
        self.read("points_to_end", |record| !record.has_item)
    }

    /// Whether the cursor is at index 0.
    pub fn points_to_beginning(&self) -> Result<bool, AccessError> {
        self.read("points_to_beginning", CursorRecord::points_to_beginning)
    }

    /// Whether a step forward would succeed.
    pub fn has_next(&self) -> Result<bool, AccessError> {
        self.points_to_item()
    }

    /// Whether a step backward would succeed.
    pub fn has_previous(&self) -> Result<bool, AccessError> {
        self.read("has_previous", CursorRecord::has_previous)
    }

    /// Move to index 0.
    pub fn set_to_beginning(&mut self) -> Result<(), AccessError> {
        self.update("set_to_beginning", |record, len| {
            record.set_to_beginning(len);
            Ok(())
        })
    }

    /// Move to the end sentinel.
    pub fn set_to_end(&mut self) -> Result<(), AccessError> {
        self.update("set_to_end", |record, len| {
            record.set_to_end(len);
            Ok(())
        })
    }

    /// Step forward.
    pub fn set_to_next(&mut self) -> Result<(), AccessError> {
        self.update("set_to_next", |record, len| record.set_to_next(len))
    }

    /// Step backward.
    pub fn set_to_previous(&mut self) -> Result<(), AccessError> {
        self.update("set_to_previous", |record, len| record.set_to_previous(len))
    }

    /// Move by `n`, failing rather than clamping.
    pub fn advance(&mut self, n: isize) -> Result<(), AccessError> {
        self.update("advance", |record, len| record.jump("advance", n, len))
    }

    /// Move backward by `n`.
    pub fn regress(&mut self, n: isize) -> Result<(), AccessError> {
        self.update("regress", |record, len| match n.checked_neg() {
            Some(back) => record.jump("regress", back, len),
            None => Err(AccessError::OutOfRange {
                op: "regress",
                index: record.index,
                offset: Some(n),
                len,
            }),
        })
    }

    /// Copy the position of another cursor of the same container.
    pub fn set_to_cursor(&mut self, other: &impl CursorPosition) -> Result<(), AccessError> {
        let index = same_owner("set_to_cursor", self.owner, other)?;
        self.update("set_to_cursor", |record, len| record.set_position(index, len))
    }

    /// Run `f` on the element under the cursor.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, AccessError> {
        let store = self.store("with")?;
        let record = store.record(RecordKind::Direct, self.key);
        let item = store
            .item(record.index)
            .ok_or(AccessError::misuse("with", CursorMisuse::NoItem))?;
        Ok(f(&item))
    }

    /// Run `f` on the element under the cursor, mutably.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, AccessError> {
        let store = self.store("with_mut")?;
        let record = store.record(RecordKind::Direct, self.key);
        let mut item = store
            .item_mut(record.index)
            .ok_or(AccessError::misuse("with_mut", CursorMisuse::NoItem))?;
        Ok(f(&mut item))
    }

    /// Overwrite the element under the cursor, returning the old value.
    pub fn set_item(&self, value: T) -> Result<T, AccessError> {
        self.with_mut(|slot| std::mem::replace(slot, value))
    }

    /// Borrow the element under the cursor through its container.
    pub fn item_in<'a>(&self, vec: &'a StableVec<T>) -> Result<Ref<'a, T>, AccessError> {
        if vec.owner() != self.owner {
            return Err(AccessError::CrossOwnerMismatch {
                op: "item_in",
                expected: vec.owner(),
                found: self.owner,
            });
        }
        let index = self.position()?;
        vec.store()
            .item(index)
            .ok_or(AccessError::misuse("item_in", CursorMisuse::NoItem))
    }

    /// Order relative to another cursor of the same container.
    pub fn compare(&self, other: &impl CursorPosition) -> Result<Ordering, AccessError> {
        let theirs = same_owner("compare", self.owner, other)?;
        Ok(self.position()?.cmp(&theirs))
    }

    /// Signed distance `self - other`.
    pub fn distance(&self, other: &impl CursorPosition) -> Result<isize, AccessError> {
        let theirs = same_owner("distance", self.owner, other)?;
        let mine = self.position()?;
        distance(theirs, mine).ok_or(AccessError::out_of_range("distance", mine, theirs))
    }
}

impl<T: Clone> DirectCursor<T> {
    /// Clone the element under the cursor.
    pub fn get(&self) -> Result<T, AccessError> {
        self.with(T::clone)
    }
}

impl<T> CursorPosition for DirectCursor<T> {
    fn cursor_owner(&self) -> OwnerId {
        self.owner
    }

    fn cursor_index(&self) -> Result<usize, AccessError> {
        self.position()
    }
}

impl<T> Clone for DirectCursor<T> {
    fn clone(&self) -> Self {
        match self.store.upgrade() {
            Some(store) => {
                let record = store.record(RecordKind::Direct, self.key);
                Self::new(&store, record)
            }
            None => Self {
                store: Weak::clone(&self.store),
                owner: self.owner,
                key: self.key,
            },
        }
    }
}

impl<T> Drop for DirectCursor<T> {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.release(RecordKind::Direct, self.key);
        }
    }
}

impl<T> PartialEq for DirectCursor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && matches!((self.position(), other.position()), (Ok(a), Ok(b)) if a == b)
    }
}

impl<T> fmt::Debug for DirectCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("DirectCursor");
        out.field("owner", &self.owner).field("key", &self.key);
        match self.record() {
            Ok(record) => out
                .field("index", &record.index)
                .field("has_item", &record.has_item),
            Err(_) => out.field("reclaimed", &true),
        };
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::StableVec;

    #[test]
    fn tracks_edits_like_floating() {
        let v = StableVec::from(vec![1, 2, 3]);
        let mut d = v.direct_begin();
        d.advance(2).unwrap();
        v.erase_at(0).unwrap();
        assert_eq!(d.position().unwrap(), 1);
        assert_eq!(d.get().unwrap(), 3);
        assert_eq!(*d.item_in(&v).unwrap(), 3);
    }

    #[test]
    fn does_not_claim_store() {
        let v = StableVec::from(vec![1]);
        let d = v.direct_end();
        assert_eq!(v.claim_count(), 1);
        assert_eq!(v.direct_cursor_count(), 1);
        drop(v);
        assert!(d.is_reclaimed());
        let err = d.get().unwrap_err();
        assert!(err.is_invalid_cursor_use());
        assert!(d.position().is_err());
    }

    #[test]
    fn reclaimed_cursor_clones_and_drops_quietly() {
        let v = StableVec::from(vec![1]);
        let d = v.direct_begin();
        drop(v);
        let e = d.clone();
        assert!(e.is_reclaimed());
        assert_ne!(d, e);
        assert!(format!("{e:?}").contains("reclaimed"));
    }

    #[test]
    fn closure_access_and_write() {
        let v = StableVec::from(vec![String::from("a")]);
        let d = v.direct_begin();
        d.with_mut(|s| s.push('b')).unwrap();
        assert_eq!(d.with(|s| s.len()).unwrap(), 2);
        assert_eq!(d.set_item(String::from("z")).unwrap(), "ab");
        assert_eq!(*v.at(0).unwrap(), "z");
    }

    #[test]
    fn item_in_rejects_other_container() {
        let v = StableVec::from(vec![1]);
        let w = StableVec::from(vec![1]);
        let d = v.direct_begin();
        assert!(d.item_in(&w).unwrap_err().is_cross_owner());
    }

    #[test]
    fn mixes_with_floating_cursors() {
        let v = StableVec::from(vec![1, 2, 3]);
        let f = v.end();
        let mut d = v.direct_begin();
        d.set_to_cursor(&f).unwrap();
        assert!(d.points_to_end().unwrap());
        assert_eq!(d.distance(&v.begin()).unwrap(), 3);
        assert!(d.set_to_next().unwrap_err().is_invalid_cursor_use());
    }

    #[test]
    fn clear_resets_direct_cursor() {
        let v = StableVec::from(vec![1, 2, 3]);
        let d = v.direct_begin();
        v.clear();
        assert!(d.points_to_end().unwrap());
        assert!(d.get().unwrap_err().is_invalid_cursor_use());
    }
}
