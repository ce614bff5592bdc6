//! Tracked pointers.
//!
//! A [`TrackedPtr`] is either null or bound to a [`Registered`] object.
//! While bound, its identity is in the target's registry; binding
//! elsewhere, unbinding and dropping all unregister it first. When the
//! target is destroyed the registry nulls the pointer before the value is
//! dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use keel_core::{PointerError, PointerId};

use crate::registered::{Registered, Target};

/// The registry-visible half of a tracked pointer.
pub(crate) struct Slot<T> {
    id: PointerId,
    target: RefCell<Option<Weak<Target<T>>>>,
}

impl<T> Slot<T> {
    /// Force to null without touching the old target.
    pub(crate) fn clear(&self) {
        self.target.borrow_mut().take();
    }

    fn upgrade(&self) -> Option<Rc<Target<T>>> {
        self.target.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// A pointer that is nulled when its target is destroyed.
pub struct TrackedPtr<T> {
    slot: Rc<Slot<T>>,
}

impl<T> TrackedPtr<T> {
    /// A null pointer.
    pub fn null() -> Self {
        Self {
            slot: Rc::new(Slot {
                id: PointerId::next(),
                target: RefCell::new(None),
            }),
        }
    }

    /// A pointer bound to `target`.
    pub fn to(target: &Registered<T>) -> Self {
        let mut ptr = Self::null();
        ptr.bind(target);
        ptr
    }

    /// Identity of this pointer.
    pub fn id(&self) -> PointerId {
        self.slot.id
    }

    /// Whether the pointer is null.
    pub fn is_null(&self) -> bool {
        self.slot.upgrade().is_none()
    }

    /// Rebind to `target`, unregistering from the old target first.
    pub fn bind(&mut self, target: &Registered<T>) {
        self.bind_target(target.target());
    }

    /// Rebind to whatever `other` targets; null if `other` is null.
    pub fn bind_from(&mut self, other: &TrackedPtr<T>) {
        match other.slot.upgrade() {
            Some(target) => self.bind_target(&target),
            None => self.unbind(),
        }
    }

    /// Unregister and become null.
    pub fn unbind(&mut self) {
        let old = self.slot.target.borrow_mut().take();
        if let Some(target) = old.as_ref().and_then(Weak::upgrade) {
            target.registry.borrow_mut().unregister(self.slot.id);
            tracing::trace!(pointer = %self.slot.id, "tracked pointer unbound");
        }
    }

    /// Whether this pointer targets `target`.
    pub fn targets(&self, target: &Registered<T>) -> bool {
        self.slot
            .upgrade()
            .is_some_and(|current| Rc::ptr_eq(&current, target.target()))
    }

    /// Whether both pointers target the same object, or are both null.
    pub fn ptr_eq(&self, other: &TrackedPtr<T>) -> bool {
        match (self.slot.upgrade(), other.slot.upgrade()) {
            (Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Run `f` on the target's value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently mutably borrowed.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, PointerError> {
        let target = self.live("with")?;
        let value = target.value.borrow();
        Ok(f(&value))
    }

    /// Run `f` on the target's value, mutably.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently borrowed.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, PointerError> {
        let target = self.live("with_mut")?;
        let mut value = target.value.borrow_mut();
        Ok(f(&mut value))
    }

    /// The target's address, or null.
    ///
    /// For compatibility with raw-pointer interfaces only. Dereferencing
    /// it is `unsafe` and valid only while the target is alive and not
    /// mutably borrowed.
    pub fn as_raw(&self) -> *const T {
        match self.slot.upgrade() {
            Some(target) => target.value.as_ptr().cast_const(),
            None => std::ptr::null(),
        }
    }

    fn live(&self, op: &'static str) -> Result<Rc<Target<T>>, PointerError> {
        self.slot.upgrade().ok_or_else(|| {
            tracing::trace!(pointer = %self.slot.id, op, "null tracked pointer dereferenced");
            PointerError::NullDereference {
                pointer: self.slot.id,
            }
        })
    }

    fn bind_target(&mut self, target: &Rc<Target<T>>) {
        self.unbind();
        target
            .registry
            .borrow_mut()
            .register(self.slot.id, Rc::downgrade(&self.slot));
        *self.slot.target.borrow_mut() = Some(Rc::downgrade(target));
    }
}

impl<T: Clone> TrackedPtr<T> {
    /// Clone the target's value out.
    pub fn get(&self) -> Result<T, PointerError> {
        self.with(T::clone)
    }
}

impl<T> Clone for TrackedPtr<T> {
    /// A new pointer, registered with the same target.
    fn clone(&self) -> Self {
        let mut copy = Self::null();
        copy.bind_from(self);
        copy
    }
}

impl<T> Drop for TrackedPtr<T> {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl<T> Default for TrackedPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for TrackedPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> fmt::Debug for TrackedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedPtr")
            .field("id", &self.slot.id)
            .field("null", &self.is_null())
            .finish()
    }
}
