//! Observer registration and event fan-out
//!
//! Consumers subscribe once and receive every subsequent device lifecycle
//! event in registration order. The registry is append-only: there is no
//! unregistration, the whole registry is discarded at engine teardown.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::device::{DeviceId, DeviceKind};

/// A registered consumer of device lifecycle and volume events
///
/// Every method has a no-op default body, so a consumer implements only the
/// slots it cares about; unimplemented slots are skipped silently during
/// dispatch. Implementations must be cheap, synchronous, local mutations —
/// they run inline on the dispatch thread — and must tolerate removal
/// notifications for ids they never tracked.
pub trait DeviceObserver {
    /// A classified audio device appeared in the registry
    fn on_device_added(&self, _kind: DeviceKind, _id: DeviceId, _name: &str) {}

    /// A registry object disappeared
    ///
    /// Broadcast unconditionally: the engine does not know which observers
    /// track which ids, so this fires for every removal, device or not.
    fn on_device_removed(&self, _id: DeviceId) {}

    /// A device's volume was observed to change out-of-band
    fn on_volume_changed(&self, _kind: DeviceKind, _id: DeviceId, _volume: f32) {}

    /// A consumer asked for a device's volume to be set
    ///
    /// Fire-and-forget hand-off to whichever observer issues volume
    /// commands; no synchronous confirmation exists.
    fn on_volume_set_request(&self, _kind: DeviceKind, _id: DeviceId, _volume: f32) {}
}

/// Ordered, append-only collection of observers
///
/// Registration order is dispatch order for every broadcast. Each observer
/// invocation is isolated: a panicking observer is logged and skipped, later
/// observers in the same broadcast still run.
pub struct ObserverRegistry {
    observers: RefCell<Vec<Rc<dyn DeviceObserver>>>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Append an observer; takes effect for the next broadcast
    pub fn add(&self, observer: Rc<dyn DeviceObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Whether any observer is registered
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    /// Broadcast a device-added event in registration order
    pub fn notify_device_added(&self, kind: DeviceKind, id: DeviceId, name: &str) {
        self.broadcast("device_added", |observer| {
            observer.on_device_added(kind, id, name)
        });
    }

    /// Broadcast a device-removed event in registration order
    pub fn notify_device_removed(&self, id: DeviceId) {
        self.broadcast("device_removed", |observer| observer.on_device_removed(id));
    }

    /// Broadcast an observed volume change in registration order
    pub fn notify_volume_changed(&self, kind: DeviceKind, id: DeviceId, volume: f32) {
        self.broadcast("volume_changed", |observer| {
            observer.on_volume_changed(kind, id, volume)
        });
    }

    /// Broadcast a volume set request in registration order
    pub fn notify_volume_set_request(&self, kind: DeviceKind, id: DeviceId, volume: f32) {
        self.broadcast("volume_set_request", |observer| {
            observer.on_volume_set_request(kind, id, volume)
        });
    }

    /// Invoke `deliver` on every observer, isolating panics per invocation
    ///
    /// Dispatches over a snapshot of the registration list, so an observer
    /// registering another observer from inside a callback affects the next
    /// broadcast, not the one in flight.
    fn broadcast<F>(&self, event: &str, deliver: F)
    where
        F: Fn(&dyn DeviceObserver),
    {
        let snapshot: Vec<Rc<dyn DeviceObserver>> = self.observers.borrow().clone();

        for (index, observer) in snapshot.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| deliver(observer.as_ref())));
            if outcome.is_err() {
                tracing::warn!(
                    observer = index,
                    event,
                    "observer panicked during dispatch; continuing with remaining observers"
                );
            }
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
