// Panic isolation for offloaded tasks (ADR-002)
//
// A panicking task must still leave a `failed` envelope behind, otherwise
// the parent only sees a dead process.

use std::any::Any;
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

use crate::domain::TaskFailure;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed (the closure's own Result is inside)
    Success(T),
    /// Execution panicked
    Panicked(String),
}

impl<U> PanicGuardResult<Result<U, TaskFailure>> {
    /// Collapse a panic into a `panic` TaskFailure
    pub fn into_task_result(self) -> Result<U, TaskFailure> {
        match self {
            PanicGuardResult::Success(inner) => inner,
            PanicGuardResult::Panicked(msg) => Err(TaskFailure::new("panic", msg)),
        }
    }
}

/// Execute a closure with panic isolation
///
/// # Example
/// ```text
/// let result = execute_guarded(AssertUnwindSafe(|| task.run()));
///
/// if let PanicGuardResult::Panicked(msg) = result {
///     eprintln!("task panicked: {}", msg);
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(payload) => {
            let panic_msg = panic_message(payload.as_ref());
            error!(panic_msg = %panic_msg, "Offloaded task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
