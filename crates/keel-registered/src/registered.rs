//! Registered objects.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::pointer::TrackedPtr;
use crate::registry::LifetimeRegistry;

/// The shared allocation behind a [`Registered`] object.
pub(crate) struct Target<T> {
    pub(crate) value: RefCell<T>,
    pub(crate) registry: RefCell<LifetimeRegistry<T>>,
}

/// A value whose tracked pointers are nulled when it is destroyed.
///
/// The object is the sole owner of its value. [`TrackedPtr`]s observe it
/// without keeping it alive.
pub struct Registered<T> {
    target: Rc<Target<T>>,
}

impl<T> Registered<T> {
    /// Wrap `value` with an empty pointer registry.
    pub fn new(value: T) -> Self {
        Self {
            target: Rc::new(Target {
                value: RefCell::new(value),
                registry: RefCell::new(LifetimeRegistry::new()),
            }),
        }
    }

    /// A tracked pointer to this object.
    pub fn track(&self) -> TrackedPtr<T> {
        TrackedPtr::to(self)
    }

    /// Borrow the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.target.value.borrow()
    }

    /// Mutably borrow the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.target.value.borrow_mut()
    }

    /// Replace the value, returning the old one. Tracked pointers stay
    /// bound.
    pub fn replace(&self, value: T) -> T {
        self.target.value.replace(value)
    }

    /// Number of tracked pointers currently targeting this object.
    pub fn pointer_count(&self) -> usize {
        self.target.registry.borrow().len()
    }

    /// Destroy the object now; returns how many pointers were nulled.
    pub fn destroy(self) -> usize {
        self.null_pointers()
    }

    pub(crate) fn target(&self) -> &Rc<Target<T>> {
        &self.target
    }

    fn null_pointers(&self) -> usize {
        let summary = self.target.registry.borrow_mut().on_object_destruction();
        if summary.visited > 0 {
            tracing::debug!(
                pointers = summary.visited,
                nulled = summary.invalidated,
                "registered object destroyed, tracked pointers nulled"
            );
        }
        summary.invalidated
    }
}

impl<T: Clone> Registered<T> {
    /// Clone the value out.
    pub fn get(&self) -> T {
        self.borrow().clone()
    }
}

impl<T> Drop for Registered<T> {
    fn drop(&mut self) {
        self.null_pointers();
    }
}

impl<T: Default> Default for Registered<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Registered<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Registered<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered")
            .field("value", &self.target.value)
            .field("pointers", &self.pointer_count())
            .finish()
    }
}
