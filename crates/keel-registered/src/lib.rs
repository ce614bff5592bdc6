//! Objects that null every tracked pointer to them when destroyed.
//!
//! A [`Registered<T>`] owns a value together with a [`LifetimeRegistry`]
//! of the [`TrackedPtr`]s currently targeting it. When the object is
//! dropped (or [`Registered::destroy`]ed) the registry is walked once and
//! every member is forced to null before the value itself is dropped, so
//! no tracked pointer can observe a destroyed target.
//!
//! ```text
//! Registered<T> ──Rc──► Target<T>
//!                        ├── RefCell<T>
//!                        └── LifetimeRegistry<T>: IndexMap<PointerId, Weak<Slot>>
//! TrackedPtr<T> ──Rc──► Slot<T> { id, Option<Weak<Target<T>>> }
//! ```
//!
//! Tracked pointers never keep their target alive. A tracked pointer
//! stored inside a `Registered` can itself be targeted, which gives
//! pointers-to-pointers that null correctly at every level.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod pointer;
pub mod registered;
pub mod registry;

pub use pointer::TrackedPtr;
pub use registered::Registered;
pub use registry::{LifetimeRegistry, TargetDestroyed};
