//! Integration test: tracked pointers across object lifetimes.
//!
//! Checks that destruction nulls every pointer before the value is
//! dropped, that pointers never extend a target's lifetime, and that
//! pointers to pointers null correctly at each level.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use keel_core::PointerError;
use keel_registered::{Registered, TrackedPtr};
use keel_test_utils::{DropCounter, DropProbe};
use proptest::prelude::*;

// ── Destruction ──────────────────────────────────────────────────────

#[test]
fn destruction_nulls_every_pointer() {
    let object = Registered::new(42);
    let pointers: Vec<_> = (0..8).map(|_| object.track()).collect();
    assert_eq!(object.pointer_count(), 8);

    drop(object);
    for p in &pointers {
        assert!(p.is_null());
        assert!(matches!(p.get(), Err(PointerError::NullDereference { .. })));
    }
}

#[test]
fn pointers_do_not_extend_lifetime() {
    let counter = DropCounter::new();
    let object = Registered::new(counter.probe(1));
    let p = object.track();
    assert_eq!(p.with(DropProbe::tag).unwrap(), 1);

    drop(object);
    assert_eq!(counter.dropped(), 1);
    assert!(p.is_null());
}

/// Records, at drop time, whether the pointer to its own object was
/// already null.
struct Witness {
    watched: Rc<RefCell<TrackedPtr<Witness>>>,
    saw_null: Rc<Cell<Option<bool>>>,
}

impl Drop for Witness {
    fn drop(&mut self) {
        self.saw_null.set(Some(self.watched.borrow().is_null()));
    }
}

#[test]
fn pointers_are_null_before_value_drops() {
    let watched = Rc::new(RefCell::new(TrackedPtr::null()));
    let saw_null = Rc::new(Cell::new(None));
    let object = Registered::new(Witness {
        watched: Rc::clone(&watched),
        saw_null: Rc::clone(&saw_null),
    });
    watched.borrow_mut().bind(&object);
    assert_eq!(object.pointer_count(), 1);

    drop(object);
    assert_eq!(saw_null.get(), Some(true));
}

#[test]
fn explicit_destroy_counts_nulled_pointers() {
    let object = Registered::new("target");
    let a = object.track();
    let mut b = object.track();
    b.unbind();
    assert_eq!(object.destroy(), 1);
    assert!(a.is_null());
}

// ── Pointers to pointers ─────────────────────────────────────────────

#[test]
fn pointer_to_pointer_nulls_at_each_level() {
    let value = Registered::new(9);
    let middle = Registered::new(value.track());
    let outer: TrackedPtr<TrackedPtr<i32>> = middle.track();

    let through = outer.with(|inner| inner.get()).unwrap();
    assert_eq!(through, Ok(9));

    drop(value);
    assert!(outer.with(TrackedPtr::is_null).unwrap());

    drop(middle);
    assert!(outer.is_null());
}

#[test]
fn dropping_middle_pointer_unregisters_from_value() {
    let value = Registered::new(1);
    let middle = Registered::new(value.track());
    assert_eq!(value.pointer_count(), 1);
    let outer = middle.track();
    drop(middle);
    assert_eq!(value.pointer_count(), 0);
    assert!(outer.is_null());
}

struct Node {
    next: TrackedPtr<Node>,
}

#[test]
fn self_referencing_object_drops_cleanly() {
    let node = Registered::new(Node {
        next: TrackedPtr::null(),
    });
    let me = node.track();
    node.borrow_mut().next.bind_from(&me);
    drop(me);
    assert_eq!(node.pointer_count(), 1);
    assert!(node.borrow().next.targets(&node));
    drop(node);
}

// ── Random bind/unbind/destroy sequences ─────────────────────────────

#[derive(Clone, Debug)]
enum Step {
    Bind { pointer: usize, object: usize },
    Unbind { pointer: usize },
    CopyFrom { pointer: usize, source: usize },
    Destroy { object: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..6, 0usize..4).prop_map(|(pointer, object)| Step::Bind { pointer, object }),
        (0usize..6).prop_map(|pointer| Step::Unbind { pointer }),
        (0usize..6, 0usize..6).prop_map(|(pointer, source)| Step::CopyFrom { pointer, source }),
        (0usize..4).prop_map(|object| Step::Destroy { object }),
    ]
}

proptest! {
    #[test]
    fn null_iff_unbound_or_target_destroyed(steps in prop::collection::vec(step(), 1..50)) {
        let mut objects: Vec<Option<Registered<usize>>> =
            (0..4).map(|i| Some(Registered::new(i))).collect();
        let mut pointers: Vec<TrackedPtr<usize>> = (0..6).map(|_| TrackedPtr::null()).collect();
        // Expected target of each pointer.
        let mut expected: Vec<Option<usize>> = vec![None; 6];

        for step in steps {
            match step {
                Step::Bind { pointer, object } => {
                    if let Some(target) = &objects[object] {
                        pointers[pointer].bind(target);
                        expected[pointer] = Some(object);
                    }
                }
                Step::Unbind { pointer } => {
                    pointers[pointer].unbind();
                    expected[pointer] = None;
                }
                Step::CopyFrom { pointer, source } => {
                    let copy = pointers[source].clone();
                    pointers[pointer].bind_from(&copy);
                    expected[pointer] = expected[source];
                }
                Step::Destroy { object } => {
                    objects[object] = None;
                    for e in expected.iter_mut() {
                        if *e == Some(object) {
                            *e = None;
                        }
                    }
                }
            }

            for (p, e) in pointers.iter().zip(&expected) {
                prop_assert_eq!(p.is_null(), e.is_none());
                if let Some(object) = e {
                    prop_assert_eq!(p.get().unwrap(), *object);
                }
            }
            for (i, object) in objects.iter().enumerate() {
                if let Some(object) = object {
                    let bound = expected.iter().filter(|e| **e == Some(i)).count();
                    prop_assert_eq!(object.pointer_count(), bound);
                }
            }
        }
    }
}
