// Central Error Type for the Application

use thiserror::Error;

use crate::domain::TaskFailure;
use crate::port::LaunchError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Object graph could not be encoded, or channel bytes are not valid data
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The child process did not finish successfully
    #[error("Launch failure: {0}")]
    LaunchFailure(#[from] LaunchError),

    /// The channel held neither a completed task nor an error after the run
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Task failure reported by the child, propagated as-is
    #[error("Task failed: {0}")]
    TaskFailed(#[from] TaskFailure),

    /// Resource discovery could not run in this environment
    #[error("Environment assumption violated: {0}")]
    EnvironmentAssumption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
