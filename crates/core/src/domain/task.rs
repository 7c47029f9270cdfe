// Task Domain Model

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit of work that can be shipped to a child process and back.
///
/// The child decodes the task, calls [`OffloadTask::run`], and encodes the
/// task again. Whatever state `run` leaves behind is the result the parent
/// receives, so implementors store their outputs in their own fields.
///
/// # Example
/// ```text
/// #[derive(Serialize, Deserialize)]
/// struct LineCount { path: PathBuf, lines: Option<usize> }
///
/// impl OffloadTask for LineCount {
///     const KIND: &'static str = "line_count";
///
///     fn run(&mut self) -> Result<(), TaskFailure> {
///         let text = std::fs::read_to_string(&self.path).map_err(TaskFailure::from_error)?;
///         self.lines = Some(text.lines().count());
///         Ok(())
///     }
/// }
/// ```
pub trait OffloadTask: Serialize + DeserializeOwned + Send + 'static {
    /// Stable identifier used by the child to pick the right decoder
    const KIND: &'static str;

    /// Execute the task in place
    fn run(&mut self) -> Result<(), TaskFailure>;
}

/// Error value captured in the child and rethrown in the parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Short machine-readable category (e.g. "io", "panic", "unknown_task")
    pub kind: String,
    pub message: String,
    /// Source chain, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl TaskFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Capture an arbitrary error together with its source chain
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error,
    {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: "error".to_string(),
            message: err.to_string(),
            causes,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        for cause in &self.causes {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for TaskFailure {}
