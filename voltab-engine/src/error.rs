//! Error types for the registry synchronization engine

use thiserror::Error;

use crate::chain::LifecycleState;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure reported by a server backend primitive
///
/// Carries the server's raw result code (negative, errno-style) alongside a
/// human-readable message. Drain failures surface through this type too and
/// are treated as transient by the bridge.
#[derive(Debug, Clone, Error)]
#[error("server error {code}: {message}")]
pub struct BackendError {
    /// Raw result code as reported by the server (negative on failure)
    pub code: i32,
    /// Description of what went wrong
    pub message: String,
}

impl BackendError {
    /// Create a backend error from a raw result code and description
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors that can occur in the registry synchronization engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// A connection-chain resource could not be acquired during bring-up
    ///
    /// `stage` names the lifecycle state the chain was advancing toward.
    /// Everything acquired before the failure has already been released;
    /// the caller may attempt a fresh bring-up but the engine never retries
    /// on its own.
    #[error("connection bring-up failed while advancing to {stage}: {source}")]
    Acquire {
        stage: LifecycleState,
        #[source]
        source: BackendError,
    },

    /// Configuration rejected by [`EngineConfig::validate`](crate::EngineConfig::validate)
    #[error("invalid engine configuration: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Convenience constructor for bring-up failures
    pub(crate) fn acquire(stage: LifecycleState, source: BackendError) -> Self {
        EngineError::Acquire { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_error_names_stage() {
        let err = EngineError::acquire(
            LifecycleState::Connected,
            BackendError::new(-111, "connection refused"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("connected"), "got: {rendered}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::new(-32, "broken pipe");
        assert_eq!(err.to_string(), "server error -32: broken pipe");
    }
}
