//! A dynamic array whose cursors survive structural mutation.
//!
//! Every cursor into a [`StableVec`] is backed by a record in the
//! container's registry. Each insertion, removal, resize or reallocation
//! walks the registry once before the mutating call returns, so a cursor
//! either still addresses the same logical element or has been sent to the
//! end sentinel. It never dangles.
//!
//! # Architecture
//!
//! ```text
//! StableVec<T> ──claim──┐
//! Cursor<T, A> ──claim──┼──► Store<T>
//! DirectCursor<T> ─weak─┘     ├── StorageCore<T>   (Vec<T> + buffer generation)
//!                             └── CursorRegistry
//!                                 ├── IndexMap<CursorKey, CursorRecord>  (floating)
//!                                 └── SmallVec<(CursorKey, CursorRecord)> (direct)
//! ```
//!
//! Storage operations return a [`ChangeReport`]; the registry turns it into
//! one combined invalidate-and-shift pass, a resync pass when the buffer
//! moved, or a reset of every record on bulk replacement.
//!
//! # Cursor kinds
//!
//! - **Floating** ([`Cursor`], [`ReadCursor`]): claim the store, so the
//!   elements stay reachable after the container itself is dropped.
//! - **Direct** ([`DirectCursor`]): weak; fail with
//!   [`CursorMisuse::StoreReclaimed`](keel_core::CursorMisuse::StoreReclaimed)
//!   once the last claim is gone.
//!
//! Everything is single-threaded (`Rc` + `RefCell`), so none of the types
//! are `Send` or `Sync`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cursor;
pub mod direct;
pub mod iter;
pub mod record;
pub mod registry;
pub mod report;
pub mod storage;
mod store;
pub mod vec;

// Public re-exports for the primary API surface.
pub use config::VecConfig;
pub use cursor::{Access, Cursor, CursorPosition, Mutable, ReadCursor, ReadOnly};
pub use direct::DirectCursor;
pub use iter::Iter;
pub use record::CursorRecord;
pub use registry::{CursorRegistry, RecordKind};
pub use report::{ChangeReport, Edit};
pub use storage::StorageCore;
pub use vec::StableVec;
