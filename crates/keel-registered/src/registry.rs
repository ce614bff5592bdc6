//! The per-object registry of tracked pointers.

use std::rc::Weak;

use indexmap::IndexMap;
use keel_core::{broadcast, BroadcastSummary, Observer, PointerId, Reaction};

use crate::pointer::Slot;

/// Event delivered to every registered pointer when its target dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDestroyed;

/// One registered pointer, held weakly.
pub(crate) struct Registration<T>(Weak<Slot<T>>);

impl<T> Observer<TargetDestroyed> for Registration<T> {
    fn observe(&mut self, _event: &TargetDestroyed) -> Reaction {
        match self.0.upgrade() {
            Some(slot) => {
                slot.clear();
                Reaction::Invalidated
            }
            None => Reaction::Unchanged,
        }
    }
}

/// The set of tracked pointers currently targeting one object.
pub struct LifetimeRegistry<T> {
    members: IndexMap<PointerId, Registration<T>>,
}

impl<T> LifetimeRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            members: IndexMap::new(),
        }
    }

    /// Number of registered pointers.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no pointer is registered.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the pointer `id` is registered.
    pub fn contains(&self, id: PointerId) -> bool {
        self.members.contains_key(&id)
    }

    /// Add a pointer. Returns `false` if it was already registered.
    pub(crate) fn register(&mut self, id: PointerId, slot: Weak<Slot<T>>) -> bool {
        self.members.insert(id, Registration(slot)).is_none()
    }

    /// Remove a pointer. Returns `false` if it was not registered.
    pub(crate) fn unregister(&mut self, id: PointerId) -> bool {
        self.members.swap_remove(&id).is_some()
    }

    /// Null every registered pointer and forget them all.
    pub(crate) fn on_object_destruction(&mut self) -> BroadcastSummary {
        let summary = broadcast(self.members.values_mut(), &TargetDestroyed);
        self.members.clear();
        summary
    }
}

impl<T> std::fmt::Debug for LifetimeRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.members.keys()).finish()
    }
}
