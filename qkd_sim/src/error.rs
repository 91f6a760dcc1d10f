//! Error types for the simulation harness.

use qkd_core::QkdError;
use thiserror::Error;

/// Errors that can occur while orchestrating runs.
#[derive(Debug, Error)]
pub enum SimError {
    /// The core rejected a parameter set
    #[error("Simulation error: {0}")]
    Core(#[from] QkdError),

    /// Reading params or writing an export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Params file or export could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Orchestration request is malformed (bad step count, unknown name, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SimError {
    /// Creates an invalid-request error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

/// Result alias for the harness.
pub type SimResult<T> = std::result::Result<T, SimError>;
