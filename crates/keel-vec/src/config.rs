//! Container configuration parameters.

/// Configuration for a [`StableVec`](crate::StableVec).
///
/// Fixed at construction; all values are immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VecConfig {
    /// Capacity reserved up front, in elements.
    ///
    /// Default: 0 (no allocation until the first insertion).
    pub initial_capacity: usize,

    /// Whether every cursor record is checked against the container length
    /// and buffer generation after each update.
    ///
    /// Default: on in debug builds, off in release builds. A failed check
    /// is an internal inconsistency and panics.
    pub verify_records: bool,
}

impl VecConfig {
    /// Default initial capacity.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

    /// Default record verification: follows `debug_assertions`.
    pub const DEFAULT_VERIFY_RECORDS: bool = cfg!(debug_assertions);

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            verify_records: Self::DEFAULT_VERIFY_RECORDS,
        }
    }

    /// Reserve `capacity` elements at construction.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Turn record verification on or off.
    pub fn with_verify_records(mut self, verify: bool) -> Self {
        self.verify_records = verify;
        self
    }
}

impl Default for VecConfig {
    fn default() -> Self {
        Self::new()
    }
}
