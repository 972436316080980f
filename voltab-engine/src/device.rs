//! Core device model shared by the engine and its consumers

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known registry object types and property keys
///
/// These mirror the wire-level names used by the audio server. Only the node
/// interface carries audio endpoints; clients, metadata objects and the like
/// are announced through the same registry but are never devices.
pub mod keys {
    /// Registry type name for audio nodes
    pub const INTERFACE_NODE: &str = "PipeWire:Interface:Node";

    /// Property carrying the capability class (`Audio/Sink`, `Audio/Source`, ...)
    pub const MEDIA_CLASS: &str = "media.class";

    /// Property carrying the human-readable node name
    pub const NODE_NAME: &str = "node.name";
}

/// Server-assigned handle for a live registry object
///
/// Unique only among *currently live* objects: after a removal the server may
/// hand the same number to an unrelated later object, so an id must never be
/// treated as a stable long-term key across a remove/add pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Create a DeviceId from the raw server handle
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw handle value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Classification of an audio-capable endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Playback endpoint (`Audio/Sink`)
    Sink,
    /// Capture endpoint (`Audio/Source`)
    Source,
}

impl DeviceKind {
    /// Map a capability-class property value to a device kind
    ///
    /// Returns `None` for any value other than the two audio classes; the
    /// caller is expected to ignore those objects entirely.
    pub fn from_media_class(class: &str) -> Option<Self> {
        match class {
            "Audio/Sink" => Some(DeviceKind::Sink),
            "Audio/Source" => Some(DeviceKind::Source),
            _ => None,
        }
    }

    /// The capability-class value this kind was mapped from
    pub fn media_class(&self) -> &'static str {
        match self {
            DeviceKind::Sink => "Audio/Sink",
            DeviceKind::Source => "Audio/Source",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Sink => write!(f, "sink"),
            DeviceKind::Source => write!(f, "source"),
        }
    }
}

/// Raw "object appeared" announcement from the server registry
///
/// Carries whatever the server said about the object; classification into
/// devices happens downstream in the registry event processor.
#[derive(Debug, Clone)]
pub struct GlobalObject {
    /// Server-assigned object id
    pub id: u32,
    /// Registry type name, e.g. [`keys::INTERFACE_NODE`]
    pub type_name: String,
    /// Interface version announced by the server
    pub version: u32,
    /// String-keyed property dictionary
    pub props: HashMap<String, String>,
}

impl GlobalObject {
    /// Create an announcement with no properties
    pub fn new(id: u32, type_name: impl Into<String>, version: u32) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            version,
            props: HashMap::new(),
        }
    }

    /// Attach a property (builder style, used heavily by tests)
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Look up a property value
    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_class_mapping() {
        assert_eq!(
            DeviceKind::from_media_class("Audio/Sink"),
            Some(DeviceKind::Sink)
        );
        assert_eq!(
            DeviceKind::from_media_class("Audio/Source"),
            Some(DeviceKind::Source)
        );
        assert_eq!(DeviceKind::from_media_class("Stream/Output/Audio"), None);
        assert_eq!(DeviceKind::from_media_class(""), None);
    }

    #[test]
    fn test_media_class_round_trip() {
        for kind in [DeviceKind::Sink, DeviceKind::Source] {
            assert_eq!(DeviceKind::from_media_class(kind.media_class()), Some(kind));
        }
    }

    #[test]
    fn test_global_object_props() {
        let obj = GlobalObject::new(7, keys::INTERFACE_NODE, 3)
            .with_prop(keys::MEDIA_CLASS, "Audio/Sink")
            .with_prop(keys::NODE_NAME, "Speakers");

        assert_eq!(obj.prop(keys::MEDIA_CLASS), Some("Audio/Sink"));
        assert_eq!(obj.prop(keys::NODE_NAME), Some("Speakers"));
        assert_eq!(obj.prop("object.serial"), None);
    }
}
