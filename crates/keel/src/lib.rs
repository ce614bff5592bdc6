//! Keel: stable references into mutable arrays and destructible objects.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Keel sub-crates. For most users, adding `keel` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use keel::prelude::*;
//!
//! let v: StableVec<i32> = vec![1, 2, 3, 4].into();
//! let mut cursor = v.begin();
//! cursor.advance(2).unwrap();
//! assert_eq!(*cursor.item().unwrap(), 3);
//!
//! // Erasing before the cursor shifts it; it still sees the same element.
//! v.erase_at(0).unwrap();
//! assert_eq!(cursor.position(), 1);
//! assert_eq!(*cursor.item().unwrap(), 3);
//!
//! // Erasing under the cursor sends it to the end sentinel.
//! v.erase(&cursor).unwrap();
//! assert!(cursor.points_to_end());
//! assert!(cursor.item().is_err());
//!
//! // Tracked pointers are nulled when their target is destroyed.
//! let object = Registered::new(String::from("target"));
//! let ptr = object.track();
//! assert_eq!(ptr.get().unwrap(), "target");
//! drop(object);
//! assert!(ptr.is_null());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `keel-core` | IDs, error types, checked index arithmetic, the observer trait |
//! | [`vec`] | `keel-vec` | `StableVec`, floating and direct cursors, the cursor registry |
//! | [`registered`] | `keel-registered` | `Registered` objects and `TrackedPtr` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors, and IDs (`keel-core`).
///
/// Contains [`types::AccessError`], [`types::PointerError`], the
/// identifier newtypes, and the [`types::Observer`] trait both registries
/// are built on.
pub use keel_core as types;

/// The stable-reference dynamic array (`keel-vec`).
///
/// [`vec::StableVec`] with its [`vec::Cursor`], [`vec::ReadCursor`] and
/// [`vec::DirectCursor`] handles, plus the storage core and registry
/// they sit on.
pub use keel_vec as vec;

/// Objects that null their tracked pointers on destruction
/// (`keel-registered`).
pub use keel_registered as registered;

/// Common imports for typical Keel usage.
///
/// ```rust
/// use keel::prelude::*;
/// ```
pub mod prelude {
    // Containers and cursors
    pub use keel_vec::{
        Cursor, CursorPosition, DirectCursor, ReadCursor, StableVec, VecConfig,
    };

    // Object lifetime tracking
    pub use keel_registered::{Registered, TrackedPtr};

    // Errors
    pub use keel_core::{AccessError, CursorMisuse, PointerError};
}
