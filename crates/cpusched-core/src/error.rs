//! Error types for cpusched

use thiserror::Error;

/// Result type for scheduling operations
pub type Result<T> = std::result::Result<T, SchedError>;

/// Errors that can occur while building or simulating a process set
#[derive(Error, Debug)]
pub enum SchedError {
    /// Rejected input: empty set, invalid process fields, unknown policy, bad quantum
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal-logic fault inside a policy. Never expected for validated input.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// IO error (scenario files, report output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invariant violation
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}
