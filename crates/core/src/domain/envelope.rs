// Channel Envelope (on-disk / on-wire format)
//
// Parent writes `pending`, child overwrites with `completed` or `failed`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::task::{OffloadTask, TaskFailure};
use crate::error::{AppError, Result};

/// Version of the parent/child invocation contract carried in every envelope
pub const CONTRACT_VERSION: u32 = 1;

/// Envelope status, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvelopeStatus::Pending => write!(f, "PENDING"),
            EnvelopeStatus::Completed => write!(f, "COMPLETED"),
            EnvelopeStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Content of a task channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope {
    Pending {
        contract: u32,
        kind: String,
        task: Value,
    },
    Completed {
        contract: u32,
        kind: String,
        task: Value,
    },
    Failed {
        contract: u32,
        kind: String,
        error: TaskFailure,
    },
}

impl Envelope {
    /// Wrap a task that has not run yet
    pub fn pending<T: OffloadTask>(task: &T) -> Result<Self> {
        Ok(Envelope::Pending {
            contract: CONTRACT_VERSION,
            kind: T::KIND.to_string(),
            task: serde_json::to_value(task)?,
        })
    }

    /// Wrap an already-encoded task after a successful run
    pub fn completed(kind: impl Into<String>, task: Value) -> Self {
        Envelope::Completed {
            contract: CONTRACT_VERSION,
            kind: kind.into(),
            task,
        }
    }

    pub fn failed(kind: impl Into<String>, error: TaskFailure) -> Self {
        Envelope::Failed {
            contract: CONTRACT_VERSION,
            kind: kind.into(),
            error,
        }
    }

    pub fn contract(&self) -> u32 {
        match self {
            Envelope::Pending { contract, .. }
            | Envelope::Completed { contract, .. }
            | Envelope::Failed { contract, .. } => *contract,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Envelope::Pending { kind, .. }
            | Envelope::Completed { kind, .. }
            | Envelope::Failed { kind, .. } => kind,
        }
    }

    pub fn status(&self) -> EnvelopeStatus {
        match self {
            Envelope::Pending { .. } => EnvelopeStatus::Pending,
            Envelope::Completed { .. } => EnvelopeStatus::Completed,
            Envelope::Failed { .. } => EnvelopeStatus::Failed,
        }
    }

    /// Interpret already-decoded JSON as an envelope.
    ///
    /// Well-formed JSON that is not an envelope is a protocol violation.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| AppError::ProtocolViolation(format!("unrecognized channel content: {}", e)))
    }

    /// Interpret the envelope the child left behind
    ///
    /// # Errors
    /// - AppError::TaskFailed if the child reported a failure
    /// - AppError::ProtocolViolation on version/kind mismatch or a still-pending envelope
    /// - AppError::Serialization if the completed task does not decode as `T`
    pub fn into_outcome<T: OffloadTask>(self) -> Result<T> {
        if self.contract() != CONTRACT_VERSION {
            return Err(AppError::ProtocolViolation(format!(
                "contract version {} (expected {})",
                self.contract(),
                CONTRACT_VERSION
            )));
        }

        if self.kind() != T::KIND {
            return Err(AppError::ProtocolViolation(format!(
                "task kind '{}' (expected '{}')",
                self.kind(),
                T::KIND
            )));
        }

        match self {
            Envelope::Completed { task, .. } => Ok(serde_json::from_value(task)?),
            Envelope::Failed { error, .. } => Err(AppError::TaskFailed(error)),
            Envelope::Pending { .. } => Err(AppError::ProtocolViolation(
                "child exited without writing a result".to_string(),
            )),
        }
    }
}
