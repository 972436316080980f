//! Per-tab mirror of the live device set
//!
//! Each settings tab owns one mirror and registers it as an observer with
//! the engine. The mirror keeps its own authoritative cache of currently
//! known devices, one map per device kind, keyed by server id. Ids are only
//! unique among live devices — the server may reuse a number after a removal
//! — so re-insertion overwrites rather than merges.
//!
//! All mutation happens on the dispatch thread; interior mutability through
//! `RefCell` lets an `Rc<DeviceMirror>` register directly as an observer
//! while the owning tab keeps its own handle for queries.

use std::cell::RefCell;
use std::collections::HashMap;

use voltab_engine::{DeviceId, DeviceKind, DeviceObserver};

use crate::record::DeviceRecord;

/// Cache of currently known devices for one consumer
pub struct DeviceMirror {
    sinks: RefCell<HashMap<DeviceId, DeviceRecord>>,
    sources: RefCell<HashMap<DeviceId, DeviceRecord>>,
}

impl DeviceMirror {
    /// Create an empty mirror
    pub fn new() -> Self {
        Self {
            sinks: RefCell::new(HashMap::new()),
            sources: RefCell::new(HashMap::new()),
        }
    }

    fn map_for(&self, kind: DeviceKind) -> &RefCell<HashMap<DeviceId, DeviceRecord>> {
        match kind {
            DeviceKind::Sink => &self.sinks,
            DeviceKind::Source => &self.sources,
        }
    }

    /// Look up a tracked device
    pub fn get(&self, kind: DeviceKind, id: DeviceId) -> Option<DeviceRecord> {
        self.map_for(kind).borrow().get(&id).cloned()
    }

    /// Snapshot of all tracked devices of one kind, in id order
    pub fn devices(&self, kind: DeviceKind) -> Vec<(DeviceId, DeviceRecord)> {
        let mut devices: Vec<(DeviceId, DeviceRecord)> = self
            .map_for(kind)
            .borrow()
            .iter()
            .map(|(id, record)| (*id, record.clone()))
            .collect();
        devices.sort_by_key(|(id, _)| *id);
        devices
    }

    /// Total number of tracked devices across both kinds
    pub fn tracked_count(&self) -> usize {
        self.sinks.borrow().len() + self.sources.borrow().len()
    }

    /// Whether the mirror tracks nothing
    pub fn is_empty(&self) -> bool {
        self.tracked_count() == 0
    }

    /// Drop every tracked entry
    ///
    /// Called when the owning tab resets; dropping the mirror itself frees
    /// everything as well.
    pub fn clear(&self) {
        self.sinks.borrow_mut().clear();
        self.sources.borrow_mut().clear();
    }

    /// Remove the entry for `id`, whichever map holds it
    ///
    /// An id belongs to exactly one map at a time, so the first match is the
    /// only match. Returns the removed record, or `None` for ids this mirror
    /// never tracked (not an error: removal is broadcast unconditionally).
    fn evict(&self, id: DeviceId) -> Option<DeviceRecord> {
        if let Some(record) = self.sinks.borrow_mut().remove(&id) {
            return Some(record);
        }
        self.sources.borrow_mut().remove(&id)
    }
}

impl Default for DeviceMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceObserver for DeviceMirror {
    fn on_device_added(&self, kind: DeviceKind, id: DeviceId, name: &str) {
        // The server may hand out a removed id again, possibly for a device
        // of the other kind; drop any stale entry before inserting.
        self.evict(id);
        self.map_for(kind)
            .borrow_mut()
            .insert(id, DeviceRecord::new(name));
        tracing::debug!(%kind, %id, name, "mirror tracking device");
    }

    fn on_device_removed(&self, id: DeviceId) {
        if let Some(record) = self.evict(id) {
            tracing::debug!(%id, name = record.name, "mirror dropped device");
        }
    }

    fn on_volume_changed(&self, kind: DeviceKind, id: DeviceId, volume: f32) {
        if let Some(record) = self.map_for(kind).borrow_mut().get_mut(&id) {
            record.volume = volume;
        }
    }
}
