//! Locally-owned device records

use serde::{Deserialize, Serialize};

/// What a mirror knows about one tracked device
///
/// The name is copied at discovery time; the server protocol has no rename
/// event, so it never changes for the lifetime of the entry. Volume is the
/// last value reported through the volume-change slot, `0.0` until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Display name captured when the device appeared
    pub name: String,
    /// Last-known volume in `0.0..=1.0`
    pub volume: f32,
}

impl DeviceRecord {
    /// Create a record for a freshly discovered device
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = DeviceRecord::new("Speakers");
        assert_eq!(record.name, "Speakers");
        assert_eq!(record.volume, 0.0);
    }
}
