// Child side of the round trip
//
// Reads the pending envelope, runs the registered task under a panic
// guard and writes back `completed` or `failed`. Errors returned from here
// mean no outcome could be written; the runner turns them into a non-zero
// exit code so the parent sees a launch failure.

use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tracing::{info, warn};

use super::panic_guard::execute_guarded;
use super::serializer;
use crate::domain::{Envelope, EnvelopeStatus, OffloadTask, TaskFailure, CONTRACT_VERSION};
use crate::error::{AppError, Result};

type Handler = Box<dyn Fn(Value) -> std::result::Result<Value, TaskFailure> + Send + Sync>;

/// Task kinds this child knows how to run
#[derive(Default)]
pub struct TaskRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task type under its `KIND`. Re-registering a kind replaces it.
    pub fn register<T: OffloadTask>(&mut self) -> &mut Self {
        if self.handlers.insert(T::KIND, Box::new(run_erased::<T>)).is_some() {
            warn!(kind = T::KIND, "Task kind registered twice, keeping the latest");
        }
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Turn a pending envelope into a completed or failed one
    ///
    /// # Errors
    /// - AppError::ProtocolViolation if the envelope is not pending or uses another contract version
    pub fn handle(&self, envelope: Envelope) -> Result<Envelope> {
        if envelope.contract() != CONTRACT_VERSION {
            return Err(AppError::ProtocolViolation(format!(
                "contract version {} (runner speaks {})",
                envelope.contract(),
                CONTRACT_VERSION
            )));
        }

        let (kind, task) = match envelope {
            Envelope::Pending { kind, task, .. } => (kind, task),
            other => {
                return Err(AppError::ProtocolViolation(format!(
                    "expected a pending task, found {}",
                    other.status()
                )))
            }
        };

        let Some(handler) = self.handlers.get(kind.as_str()) else {
            warn!(kind = %kind, "No handler registered for task kind");
            let failure = TaskFailure::new("unknown_task", format!("no task registered as '{}'", kind));
            return Ok(Envelope::failed(kind, failure));
        };

        let outcome = execute_guarded(AssertUnwindSafe(|| handler(task))).into_task_result();

        Ok(match outcome {
            Ok(task) => Envelope::completed(kind, task),
            Err(failure) => Envelope::failed(kind, failure),
        })
    }

    /// Byte-level variant of [`TaskRegistry::handle`]
    pub fn process_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        serializer::encode(&self.handle(serializer::decode_envelope(input)?)?)
    }
}

fn run_erased<T: OffloadTask>(task: Value) -> std::result::Result<Value, TaskFailure> {
    let mut task: T = serde_json::from_value(task).map_err(|e| TaskFailure::new("decode", e.to_string()))?;
    task.run()?;
    serde_json::to_value(&task).map_err(|e| TaskFailure::new("encode", e.to_string()))
}

/// Run the task stored in the file at `path` and overwrite the file with the outcome
pub fn run_channel_file(registry: &TaskRegistry, path: &Path) -> Result<EnvelopeStatus> {
    let envelope = registry.handle(serializer::read_envelope(path)?)?;
    let status = envelope.status();

    serializer::write(path, &envelope)?;

    info!(
        path = %path.display(),
        kind = envelope.kind(),
        status = %status,
        "Task outcome written"
    );

    Ok(status)
}
