//! Core types and traits for the Keel stable-reference workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the cursor registry (`keel-vec`) and the
//! object-lifetime registry (`keel-registered`): identifiers, the error
//! taxonomy, checked index arithmetic, and the [`Observer`] trait both
//! registries broadcast through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod index;
pub mod observer;

pub use error::{AccessError, CursorMisuse, Inconsistency, PointerError};
pub use id::{CursorKey, OwnerId, PointerId};
pub use index::Delta;
pub use observer::{broadcast, BroadcastSummary, Observer, Reaction};
