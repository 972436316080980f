//! Configuration for the registry synchronization engine

use crate::error::{EngineError, Result};

/// Configuration for [`AudioRegistry`](crate::AudioRegistry)
///
/// Controls how the engine connects to the audio server and how it presents
/// devices whose announcements are incomplete.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Name of the server instance to connect to
    /// Default: `None` (the server's default instance)
    pub remote: Option<String>,

    /// Display name substituted when a device announcement carries no name
    /// Default: `"unknown"`
    pub fallback_device_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote: None,
            fallback_device_name: "unknown".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create an EngineConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to a named server instance instead of the default one
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Override the placeholder name used for unnamed devices
    pub fn with_fallback_device_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_device_name = name.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fallback_device_name.is_empty() {
            return Err(EngineError::Configuration(
                "Fallback device name must not be empty".to_string(),
            ));
        }

        if let Some(remote) = &self.remote {
            if remote.is_empty() {
                return Err(EngineError::Configuration(
                    "Remote name must not be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.remote.is_none());
        assert_eq!(config.fallback_device_name, "unknown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_remote("pipewire-1")
            .with_fallback_device_name("(unnamed)");
        assert_eq!(config.remote.as_deref(), Some("pipewire-1"));
        assert_eq!(config.fallback_device_name, "(unnamed)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let empty_fallback = EngineConfig::new().with_fallback_device_name("");
        assert!(empty_fallback.validate().is_err());

        let empty_remote = EngineConfig::new().with_remote("");
        assert!(empty_remote.validate().is_err());
    }
}
