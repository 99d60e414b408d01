//! Error types for the telemetry engine

use std::fmt;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur inside the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The entity list or a snapshot could not be fetched from the source
    SourceUnavailable(String),

    /// Operator-submitted thresholds were rejected
    InvalidThresholds(String),

    /// The poller actor is no longer running
    ActorStopped,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::SourceUnavailable(msg) => write!(f, "snapshot source unavailable: {}", msg),
            EngineError::InvalidThresholds(msg) => write!(f, "invalid alert thresholds: {}", msg),
            EngineError::ActorStopped => write!(f, "poller actor is not running"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::SourceUnavailable(err.to_string())
    }
}
