//! Classification of raw registry events into device lifecycle events
//!
//! The processor is the listener the connection chain attaches to the server
//! registry. It filters announcements down to audio-capable nodes and turns
//! them into observer broadcasts, in exactly the order the server emitted
//! them. Most registry objects (stream clients, metadata, ports) are
//! legitimately not devices, so unclassifiable announcements are ignored
//! without logging an error.

use std::rc::Rc;

use crate::backend::RegistryHandler;
use crate::device::{keys, DeviceId, DeviceKind, GlobalObject};
use crate::observers::ObserverRegistry;

/// Turns raw registry notifications into classified observer broadcasts
pub struct RegistryEventProcessor {
    observers: Rc<ObserverRegistry>,
    fallback_name: String,
}

impl RegistryEventProcessor {
    /// Create a processor broadcasting through the given registry
    ///
    /// `fallback_name` is substituted when a device announcement carries no
    /// display name.
    pub fn new(observers: Rc<ObserverRegistry>, fallback_name: impl Into<String>) -> Self {
        Self {
            observers,
            fallback_name: fallback_name.into(),
        }
    }

    /// Classify an announcement, returning `None` for non-devices
    fn classify(&self, object: &GlobalObject) -> Option<(DeviceKind, DeviceId)> {
        if object.type_name != keys::INTERFACE_NODE {
            return None;
        }

        let class = object.prop(keys::MEDIA_CLASS)?;
        let kind = DeviceKind::from_media_class(class)?;

        Some((kind, DeviceId::new(object.id)))
    }
}

impl RegistryHandler for RegistryEventProcessor {
    fn object_appeared(&self, object: &GlobalObject) {
        let Some((kind, id)) = self.classify(object) else {
            return;
        };

        let name = object
            .prop(keys::NODE_NAME)
            .unwrap_or(self.fallback_name.as_str());

        tracing::debug!(%kind, %id, name, "device appeared");
        self.observers.notify_device_added(kind, id, name);
    }

    fn object_disappeared(&self, id: u32) {
        // The processor keeps no state and cannot tell devices from other
        // objects here; observers must no-op on ids they never tracked.
        let id = DeviceId::new(id);
        tracing::debug!(%id, "registry object disappeared");
        self.observers.notify_device_removed(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::DeviceObserver;
    use std::cell::RefCell;

    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl DeviceObserver for Recorder {
        fn on_device_added(&self, kind: DeviceKind, id: DeviceId, name: &str) {
            self.events
                .borrow_mut()
                .push(format!("added:{kind}:{id}:{name}"));
        }

        fn on_device_removed(&self, id: DeviceId) {
            self.events.borrow_mut().push(format!("removed:{id}"));
        }
    }

    fn recording_processor() -> (RegistryEventProcessor, Rc<RefCell<Vec<String>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let observers = Rc::new(ObserverRegistry::new());
        observers.add(Rc::new(Recorder {
            events: Rc::clone(&events),
        }));
        (RegistryEventProcessor::new(observers, "unknown"), events)
    }

    fn sink_node(id: u32, name: &str) -> GlobalObject {
        GlobalObject::new(id, keys::INTERFACE_NODE, 3)
            .with_prop(keys::MEDIA_CLASS, "Audio/Sink")
            .with_prop(keys::NODE_NAME, name)
    }

    #[test]
    fn test_sink_and_source_are_classified() {
        let (processor, events) = recording_processor();

        processor.object_appeared(&sink_node(7, "Speakers"));
        processor.object_appeared(
            &GlobalObject::new(8, keys::INTERFACE_NODE, 3)
                .with_prop(keys::MEDIA_CLASS, "Audio/Source")
                .with_prop(keys::NODE_NAME, "Mic"),
        );

        assert_eq!(
            *events.borrow(),
            vec!["added:sink:7:Speakers", "added:source:8:Mic"]
        );
    }

    #[test]
    fn test_missing_media_class_is_ignored() {
        let (processor, events) = recording_processor();

        processor.object_appeared(
            &GlobalObject::new(12, keys::INTERFACE_NODE, 3).with_prop(keys::NODE_NAME, "mystery"),
        );

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_unrecognized_media_class_is_ignored() {
        let (processor, events) = recording_processor();

        processor.object_appeared(
            &GlobalObject::new(13, keys::INTERFACE_NODE, 3)
                .with_prop(keys::MEDIA_CLASS, "Stream/Output/Audio"),
        );

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_non_node_objects_are_ignored() {
        let (processor, events) = recording_processor();

        processor.object_appeared(
            &GlobalObject::new(14, "PipeWire:Interface:Client", 3)
                .with_prop(keys::MEDIA_CLASS, "Audio/Sink"),
        );

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_missing_name_uses_fallback() {
        let (processor, events) = recording_processor();

        processor.object_appeared(
            &GlobalObject::new(15, keys::INTERFACE_NODE, 3)
                .with_prop(keys::MEDIA_CLASS, "Audio/Sink"),
        );

        assert_eq!(*events.borrow(), vec!["added:sink:15:unknown"]);
    }

    #[test]
    fn test_disappeared_is_broadcast_unconditionally() {
        let (processor, events) = recording_processor();

        // Never announced, still broadcast; observers are no-op safe.
        processor.object_disappeared(99);

        assert_eq!(*events.borrow(), vec!["removed:99"]);
    }
}
