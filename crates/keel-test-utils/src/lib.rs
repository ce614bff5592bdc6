//! Test utilities for Keel development.
//!
//! Provides [`DropCounter`] / [`DropProbe`] for asserting when storage is
//! reclaimed, and the [`PositionModel`] reference model that property
//! tests check real cursors against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod model;

pub use model::{ModelCursor, PositionModel};

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared count of dropped [`DropProbe`]s.
#[derive(Clone, Debug, Default)]
pub struct DropCounter {
    dropped: Rc<Cell<usize>>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe tagged `tag` that bumps this counter when dropped.
    pub fn probe(&self, tag: u32) -> DropProbe {
        DropProbe {
            tag,
            counter: self.clone(),
        }
    }

    /// Probes dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped.get()
    }
}

/// An element that records its own drop.
///
/// Cloning yields an independent probe with the same tag and counter.
pub struct DropProbe {
    tag: u32,
    counter: DropCounter,
}

impl DropProbe {
    pub fn tag(&self) -> u32 {
        self.tag
    }
}

impl Clone for DropProbe {
    fn clone(&self) -> Self {
        self.counter.probe(self.tag)
    }
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        let dropped = &self.counter.dropped;
        dropped.set(dropped.get() + 1);
    }
}

impl PartialEq for DropProbe {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl fmt::Debug for DropProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DropProbe({})", self.tag)
    }
}
