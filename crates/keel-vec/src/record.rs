//! Cursor records and the events that update them.
//!
//! A [`CursorRecord`] is the registry-held state behind every cursor. It
//! carries the whole cursor state machine (beginning, on-item, end
//! sentinel) as pure functions of the owner's current length, so the
//! cursor handles only have to look the record up and forward.
//!
//! Records observe [`RegistryEvent`]s. A structural edit is delivered as a
//! single [`EditPass`] holding both the span to invalidate and the span to
//! shift, each in pre-mutation indices; a record in the invalidated span is
//! sent to the sentinel once and never shifted afterwards.

use keel_core::index::{check_position, jump};
use keel_core::{AccessError, CursorMisuse, Delta, Observer, Reaction};

use crate::report::{ChangeReport, Edit};

/// Registry-held cursor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorRecord {
    /// Logical position in `[0, len]`; `len` is the end sentinel.
    pub index: usize,
    /// Whether `index` addresses an element.
    pub has_item: bool,
    /// Buffer generation this record was last synchronized against.
    pub generation: u32,
}

impl CursorRecord {
    /// A record at the beginning of an array of length `len`.
    pub fn beginning(len: usize, generation: u32) -> Self {
        Self {
            index: 0,
            has_item: len > 0,
            generation,
        }
    }

    /// A record at the end sentinel.
    pub fn end(len: usize, generation: u32) -> Self {
        Self {
            index: len,
            has_item: false,
            generation,
        }
    }

    /// A record at `index`, which may be the sentinel.
    pub fn at(index: usize, len: usize, generation: u32) -> Result<Self, AccessError> {
        check_position("cursor_at", index, len)?;
        Ok(Self {
            index,
            has_item: index < len,
            generation,
        })
    }

    /// Whether the record is at index 0.
    pub fn points_to_beginning(&self) -> bool {
        self.index == 0
    }

    /// Whether a previous position exists.
    pub fn has_previous(&self) -> bool {
        !self.points_to_beginning()
    }

    /// Jump to index 0.
    pub fn set_to_beginning(&mut self, len: usize) {
        self.index = 0;
        self.has_item = len > 0;
    }

    /// Jump to the sentinel.
    pub fn set_to_end(&mut self, len: usize) {
        self.index = len;
        self.has_item = false;
    }

    /// Step forward by one.
    pub fn set_to_next(&mut self, len: usize) -> Result<(), AccessError> {
        if !self.has_item {
            return Err(AccessError::misuse("set_to_next", CursorMisuse::PastEnd));
        }
        self.index += 1;
        self.has_item = self.index < len;
        Ok(())
    }

    /// Step backward by one.
    pub fn set_to_previous(&mut self, len: usize) -> Result<(), AccessError> {
        if !self.has_previous() {
            return Err(AccessError::misuse(
                "set_to_previous",
                CursorMisuse::BeforeBeginning,
            ));
        }
        self.index -= 1;
        self.has_item = self.index < len;
        Ok(())
    }

    /// Move by `offset`, failing rather than clamping.
    pub fn jump(&mut self, op: &'static str, offset: isize, len: usize) -> Result<(), AccessError> {
        self.index = jump(op, self.index, offset, len)?;
        self.has_item = self.index < len;
        Ok(())
    }

    /// Move to the absolute position `index`.
    pub fn set_position(&mut self, index: usize, len: usize) -> Result<(), AccessError> {
        self.index = check_position("set_position", index, len)?;
        self.has_item = index < len;
        Ok(())
    }

    /// Check both record invariants against `len`.
    pub fn check(&self, len: usize) -> Result<(), String> {
        if self.index > len {
            return Err(format!("index {} beyond length {len}", self.index));
        }
        if self.has_item != (self.index < len) {
            return Err(format!(
                "has_item is {} at index {} with length {len}",
                self.has_item, self.index
            ));
        }
        Ok(())
    }
}

/// One combined structural update, in pre-mutation indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditPass {
    /// Inclusive span sent to the sentinel.
    pub invalidate: Option<(usize, usize)>,
    /// Inclusive span renumbered by the delta.
    pub shift: Option<(usize, usize, Delta)>,
    /// Length after the mutation.
    pub len: usize,
}

impl EditPass {
    /// Derive the pass for a structural edit. `None` for bulk replacement
    /// and capacity-only changes, which are not position mappings.
    pub fn from_report(report: &ChangeReport) -> Option<Self> {
        if let Edit::Replaced { .. } = report.edit {
            return None;
        }
        let (first, last) = report.affected_span()?;
        let delta = report.delta();
        let (invalidate, shift) = match delta {
            _ if delta.is_zero() => return None,
            Delta::Grow(_) => (None, Some((first, last, delta))),
            Delta::Shrink(count) => (
                Some((first, first + count - 1)),
                Some((first + count, last, delta)),
            ),
        };
        Some(Self {
            invalidate,
            shift,
            len: report.len,
        })
    }
}

/// An event delivered to every record of one registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Invalidate then shift, in one pass.
    Edit(EditPass),
    /// The buffer moved; refresh the resolved-position cache.
    Resync {
        /// New buffer generation.
        generation: u32,
    },
    /// Bulk replacement; every record goes to the sentinel.
    Reset {
        /// Length after the replacement.
        len: usize,
    },
}

fn within(span: (usize, usize), index: usize) -> bool {
    span.0 <= index && index <= span.1
}

impl Observer<RegistryEvent> for CursorRecord {
    fn observe(&mut self, event: &RegistryEvent) -> Reaction {
        match *event {
            RegistryEvent::Edit(pass) => {
                if pass.invalidate.is_some_and(|span| within(span, self.index)) {
                    self.set_to_end(pass.len);
                    return Reaction::Invalidated;
                }
                let reaction = match pass.shift {
                    Some((first, last, delta)) if within((first, last), self.index) => {
                        match delta.apply(self.index) {
                            Some(index) => {
                                self.index = index;
                                Reaction::Updated
                            }
                            None => {
                                self.set_to_end(pass.len);
                                return Reaction::Invalidated;
                            }
                        }
                    }
                    _ => Reaction::Unchanged,
                };
                self.has_item = self.index < pass.len;
                reaction
            }
            RegistryEvent::Resync { generation } => {
                if self.generation == generation {
                    Reaction::Unchanged
                } else {
                    self.generation = generation;
                    Reaction::Updated
                }
            }
            RegistryEvent::Reset { len } => {
                self.set_to_end(len);
                Reaction::Invalidated
            }
        }
    }
}
