//! Strongly-typed identifiers for owners, cursor records, and tracked pointers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`OwnerId`] allocation.
static OWNER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Counter for unique [`PointerId`] allocation.
static POINTER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of one storage instance (the owner of a set of cursor records).
///
/// Allocated from a monotonic atomic counter via [`OwnerId::next`]. Two
/// containers always have different IDs, even if one is dropped and a new
/// one is allocated at the same address. Cursors compare owners by ID, so
/// cross-owner comparisons are detected without touching either store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh, unique owner ID.
    pub fn next() -> Self {
        Self(OWNER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Key of a cursor record inside one owner's registry.
///
/// Keys increase monotonically per registry and are never reused while the
/// owner lives, so a stale key can never alias a newer record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorKey(pub u64);

impl fmt::Display for CursorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cursor#{}", self.0)
    }
}

impl From<u64> for CursorKey {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identity of one tracked pointer.
///
/// Tracked pointers move freely, so the registry cannot key them by address.
/// Each pointer takes a process-unique ID at construction and keeps it for
/// its whole life, across rebinding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(u64);

impl PointerId {
    /// Allocate a fresh, unique pointer ID.
    pub fn next() -> Self {
        Self(POINTER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ptr#{}", self.0)
    }
}
