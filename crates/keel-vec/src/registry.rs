//! The cursor registry of one storage core.
//!
//! Floating records live in an insertion-ordered [`IndexMap`] keyed by a
//! monotonic [`CursorKey`]; direct records live in an inline [`SmallVec`].
//! Keys are never reused while the registry lives.
//!
//! [`CursorRegistry::apply`] turns a [`ChangeReport`] into at most one edit
//! pass and one resync pass, each visiting every record exactly once, and
//! then checks the record invariants when verification is enabled.

use indexmap::IndexMap;
use keel_core::{broadcast, BroadcastSummary, CursorKey, Delta, Inconsistency, OwnerId};
use smallvec::SmallVec;

use crate::record::{CursorRecord, EditPass, RegistryEvent};
use crate::report::{ChangeReport, Edit};

/// Which list a record lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Backs a floating cursor (claims the store).
    Floating,
    /// Backs a direct cursor (weak reference to the store).
    Direct,
}

/// All cursor records of one storage core.
#[derive(Debug)]
pub struct CursorRegistry {
    owner: OwnerId,
    floating: IndexMap<CursorKey, CursorRecord>,
    direct: SmallVec<[(CursorKey, CursorRecord); 4]>,
    next_key: u64,
    verify_records: bool,
}

impl CursorRegistry {
    /// Create an empty registry for `owner`.
    pub fn new(owner: OwnerId, verify: bool) -> Self {
        Self {
            owner,
            floating: IndexMap::new(),
            direct: SmallVec::new(),
            next_key: 0,
            verify_records: verify,
        }
    }

    /// The owner this registry is scoped to.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Whether invariants are checked after every update.
    pub fn verifies(&self) -> bool {
        self.verify_records
    }

    /// Live floating records.
    pub fn floating_len(&self) -> usize {
        self.floating.len()
    }

    /// Live direct records.
    pub fn direct_len(&self) -> usize {
        self.direct.len()
    }

    /// All live records.
    pub fn len(&self) -> usize {
        self.floating.len() + self.direct.len()
    }

    /// Whether no records are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `record` and return its fresh key.
    pub fn allocate(&mut self, kind: RecordKind, record: CursorRecord) -> CursorKey {
        let key = CursorKey(self.next_key);
        self.next_key += 1;
        match kind {
            RecordKind::Floating => {
                self.floating.insert(key, record);
            }
            RecordKind::Direct => self.direct.push((key, record)),
        }
        key
    }

    /// Remove a record. Unknown direct keys are ignored.
    pub fn release(&mut self, kind: RecordKind, key: CursorKey) -> Option<CursorRecord> {
        match kind {
            RecordKind::Floating => {
                let removed = self.floating.swap_remove(&key);
                debug_assert!(
                    removed.is_some(),
                    "release of unknown floating {key} in {}",
                    self.owner
                );
                removed
            }
            RecordKind::Direct => {
                let slot = self.direct.iter().position(|(k, _)| *k == key)?;
                Some(self.direct.swap_remove(slot).1)
            }
        }
    }

    /// Snapshot one record.
    pub fn record(&self, kind: RecordKind, key: CursorKey) -> Option<CursorRecord> {
        match kind {
            RecordKind::Floating => self.floating.get(&key).copied(),
            RecordKind::Direct => self
                .direct
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, record)| *record),
        }
    }

    /// Mutable access to one record.
    pub fn record_mut(&mut self, kind: RecordKind, key: CursorKey) -> Option<&mut CursorRecord> {
        match kind {
            RecordKind::Floating => self.floating.get_mut(&key),
            RecordKind::Direct => self
                .direct
                .iter_mut()
                .find(|(k, _)| *k == key)
                .map(|(_, record)| record),
        }
    }

    /// Renumber every record with index in `[first, last]` by `shift`.
    pub fn shift_inclusive_range(
        &mut self,
        first: usize,
        last: usize,
        shift: Delta,
        len: usize,
    ) -> BroadcastSummary {
        tracing::trace!(owner = %self.owner, first, last, shift = ?shift, "shift cursor records");
        self.broadcast(&RegistryEvent::Edit(EditPass {
            invalidate: None,
            shift: Some((first, last, shift)),
            len,
        }))
    }

    /// Send every record with index in `[first, last]` to the sentinel.
    pub fn invalidate_inclusive_range(
        &mut self,
        first: usize,
        last: usize,
        len: usize,
    ) -> BroadcastSummary {
        tracing::trace!(owner = %self.owner, first, last, "invalidate cursor records");
        self.broadcast(&RegistryEvent::Edit(EditPass {
            invalidate: Some((first, last)),
            shift: None,
            len,
        }))
    }

    /// Refresh the resolved-position cache of every record.
    pub fn resync_all(&mut self, generation: u32) -> BroadcastSummary {
        let summary = self.broadcast(&RegistryEvent::Resync { generation });
        tracing::debug!(
            owner = %self.owner,
            generation,
            resynced = summary.updated,
            "buffer moved, cursor records resynced"
        );
        summary
    }

    /// Send every record to the sentinel of an array of length `len`.
    pub fn reset_all(&mut self, len: usize) -> BroadcastSummary {
        let summary = self.broadcast(&RegistryEvent::Reset { len });
        tracing::debug!(owner = %self.owner, len, reset = summary.visited, "cursor records reset");
        summary
    }

    /// Bring every record in line with a storage mutation.
    ///
    /// # Panics
    ///
    /// Panics with the [`Inconsistency`] if verification is enabled and a
    /// record breaks an invariant afterwards.
    pub fn apply(&mut self, report: &ChangeReport) -> BroadcastSummary {
        let mut summary = BroadcastSummary::default();
        if report.is_noop() {
            return summary;
        }
        if let Edit::Replaced { .. } = report.edit {
            summary = self.reset_all(report.len);
        } else if let Some(pass) = EditPass::from_report(report) {
            summary = self.broadcast(&RegistryEvent::Edit(pass));
            tracing::trace!(
                owner = %self.owner,
                invalidate = ?pass.invalidate,
                shift = ?pass.shift,
                updated = summary.updated,
                invalidated = summary.invalidated,
                "cursor records updated"
            );
        }
        if report.reallocated {
            self.resync_all(report.generation);
        }
        if self.verify_records {
            if let Err(fault) = self.verify(report.len, report.generation) {
                panic!("{fault}");
            }
        }
        summary
    }

    /// Check every record against `len` and the current buffer generation.
    pub fn verify(&self, len: usize, generation: u32) -> Result<(), Inconsistency> {
        let records = self
            .floating
            .iter()
            .map(|(key, record)| (*key, record))
            .chain(self.direct.iter().map(|(key, record)| (*key, record)));
        for (key, record) in records {
            let detail = match record.check(len) {
                Err(detail) => detail,
                Ok(()) if record.generation != generation => format!(
                    "record generation {} behind buffer generation {generation}",
                    record.generation
                ),
                Ok(()) => continue,
            };
            return Err(Inconsistency {
                owner: self.owner,
                key,
                detail,
            });
        }
        Ok(())
    }

    fn broadcast(&mut self, event: &RegistryEvent) -> BroadcastSummary {
        let direct = self.direct.iter_mut().map(|(_, record)| record);
        broadcast(self.floating.values_mut().chain(direct), event)
    }
}
