//! The shared store: one storage core plus its cursor registry.
//!
//! The core and the registry sit in separate cells so a cursor can be
//! created or released while an element borrow is outstanding. Every
//! mutation follows the same sequence: borrow the core mutably, run the
//! storage operation, release the core, forward the report to the
//! registry, and only then hand removed elements back to the caller to
//! drop.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use keel_core::{AccessError, CursorKey, OwnerId};

use crate::config::VecConfig;
use crate::record::CursorRecord;
use crate::registry::{CursorRegistry, RecordKind};
use crate::report::ChangeReport;
use crate::storage::StorageCore;

/// A storage core and the registry of cursors into it.
pub(crate) struct Store<T> {
    owner: OwnerId,
    core: RefCell<StorageCore<T>>,
    registry: RefCell<CursorRegistry>,
}

/// A claim on a store.
pub(crate) type SharedStore<T> = Rc<Store<T>>;

impl<T> Store<T> {
    /// Build a store around `data` under a fresh owner.
    pub(crate) fn new(mut data: Vec<T>, config: &VecConfig) -> SharedStore<T> {
        if config.initial_capacity > data.capacity() {
            data.reserve(config.initial_capacity - data.len());
        }
        let owner = OwnerId::next();
        Rc::new(Self {
            owner,
            core: RefCell::new(StorageCore::from_vec(data)),
            registry: RefCell::new(CursorRegistry::new(owner, config.verify_records)),
        })
    }

    pub(crate) fn owner(&self) -> OwnerId {
        self.owner
    }

    pub(crate) fn len(&self) -> usize {
        self.core.borrow().len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.core.borrow().capacity()
    }

    pub(crate) fn verifies(&self) -> bool {
        self.registry.borrow().verifies()
    }

    pub(crate) fn core(&self) -> Ref<'_, StorageCore<T>> {
        self.core.borrow()
    }

    pub(crate) fn core_mut(&self) -> RefMut<'_, StorageCore<T>> {
        self.core.borrow_mut()
    }

    pub(crate) fn registry(&self) -> Ref<'_, CursorRegistry> {
        self.registry.borrow()
    }

    /// Run one storage operation and bring every cursor record in line
    /// before returning its output.
    pub(crate) fn mutate<R, F>(&self, op: F) -> Result<R, AccessError>
    where
        F: FnOnce(&mut StorageCore<T>) -> Result<(R, ChangeReport), AccessError>,
    {
        let (output, report) = op(&mut self.core.borrow_mut())?;
        self.commit(&report);
        Ok(output)
    }

    /// Forward a report produced outside [`Store::mutate`].
    pub(crate) fn commit(&self, report: &ChangeReport) {
        self.registry.borrow_mut().apply(report);
    }

    /// Register a record placed by `place`, given the current length and
    /// buffer generation.
    pub(crate) fn place<F>(&self, kind: RecordKind, place: F) -> Result<CursorKey, AccessError>
    where
        F: FnOnce(usize, u32) -> Result<CursorRecord, AccessError>,
    {
        let record = {
            let core = self.core.borrow();
            place(core.len(), core.generation())?
        };
        Ok(self.registry.borrow_mut().allocate(kind, record))
    }

    /// Register a copy of an existing record.
    pub(crate) fn allocate(&self, kind: RecordKind, record: CursorRecord) -> CursorKey {
        self.registry.borrow_mut().allocate(kind, record)
    }

    /// Release a record. Silently skipped while the registry is busy, which
    /// only happens when unwinding out of a failed update.
    pub(crate) fn release(&self, kind: RecordKind, key: CursorKey) {
        if let Ok(mut registry) = self.registry.try_borrow_mut() {
            registry.release(kind, key);
        }
    }

    /// Snapshot a live record.
    pub(crate) fn record(&self, kind: RecordKind, key: CursorKey) -> CursorRecord {
        self.registry
            .borrow()
            .record(kind, key)
            .expect("cursor record is live while its handle exists")
    }

    /// Run `f` on a live record with the current length.
    pub(crate) fn with_record<R, F>(&self, kind: RecordKind, key: CursorKey, f: F) -> R
    where
        F: FnOnce(&mut CursorRecord, usize) -> R,
    {
        let len = self.len();
        let mut registry = self.registry.borrow_mut();
        let record = registry
            .record_mut(kind, key)
            .expect("cursor record is live while its handle exists");
        f(record, len)
    }

    /// Borrow the element at `index`, if there is one.
    pub(crate) fn item(&self, index: usize) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.core.borrow(), |core| core.as_slice().get(index)).ok()
    }

    /// Mutably borrow the element at `index`, if there is one.
    pub(crate) fn item_mut(&self, index: usize) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.core.borrow_mut(), |core| core.get_mut(index).ok()).ok()
    }
}
