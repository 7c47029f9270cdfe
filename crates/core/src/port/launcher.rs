// Launcher Port (ADR-002)
// Abstraction over "start the child and wait for it" so executor logic is
// testable without spawning real processes.

use crate::domain::LaunchSpec;
use async_trait::async_trait;
use thiserror::Error;

/// Result of one child process run
#[derive(Debug, Clone)]
pub struct LaunchResult {
    /// None if the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl LaunchResult {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            duration_ms: 0,
            stdout: None,
            stderr: None,
        }
    }

    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::success()
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-successful run into an error
    ///
    /// # Errors
    /// - LaunchError::NonZeroExit if the exit code is non-zero or absent
    pub fn rethrow_failure(&self) -> Result<(), LaunchError> {
        if self.is_success() {
            return Ok(());
        }

        Err(LaunchError::NonZeroExit {
            code: self.exit_code,
            stderr: self
                .stderr
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process exited with {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Launcher trait
///
/// Implementations:
/// - SubprocessLauncher (infra-system): spawns the entry point with tokio
/// - MockLauncher: scripted behaviour for tests
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Start the child described by `spec` and wait for it to exit
    ///
    /// # Errors
    /// - LaunchError::SpawnFailed if the process cannot be started
    /// - LaunchError::IoError if waiting on the process fails
    async fn launch(&self, spec: &LaunchSpec) -> Result<LaunchResult, LaunchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Script = dyn Fn(&LaunchSpec) -> Result<LaunchResult, LaunchError> + Send + Sync;

    /// Mock Launcher for testing
    ///
    /// Runs a caller-supplied closure in place of a real child process. The
    /// closure usually reads and rewrites the channel named by the spec's
    /// locator, the way a real child would.
    #[derive(Clone)]
    pub struct MockLauncher {
        script: Arc<Script>,
        calls: Arc<Mutex<Vec<LaunchSpec>>>,
    }

    impl MockLauncher {
        pub fn new<F>(script: F) -> Self
        where
            F: Fn(&LaunchSpec) -> Result<LaunchResult, LaunchError> + Send + Sync + 'static,
        {
            Self {
                script: Arc::new(script),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Exits 0 without touching the channel
        pub fn new_noop() -> Self {
            Self::new(|_| Ok(LaunchResult::success()))
        }

        /// Exits with the given code and stderr
        pub fn new_exit(code: i32, stderr: impl Into<String>) -> Self {
            let stderr = stderr.into();
            Self::new(move |_| {
                Ok(LaunchResult {
                    stderr: Some(stderr.clone()),
                    ..LaunchResult::exited(code)
                })
            })
        }

        /// Fails before the process starts
        pub fn new_spawn_failure(message: impl Into<String>) -> Self {
            let message = message.into();
            Self::new(move |_| Err(LaunchError::SpawnFailed(message.clone())))
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_spec(&self) -> Option<LaunchSpec> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Launcher for MockLauncher {
        async fn launch(&self, spec: &LaunchSpec) -> Result<LaunchResult, LaunchError> {
            self.calls.lock().unwrap().push(spec.clone());
            (self.script)(spec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rethrow_failure_passes_success() {
        assert!(LaunchResult::success().rethrow_failure().is_ok());
    }

    #[test]
    fn test_rethrow_failure_reports_code_and_stderr() {
        let result = LaunchResult {
            stderr: Some("  bad things\n".to_string()),
            ..LaunchResult::exited(3)
        };

        match result.rethrow_failure() {
            Err(LaunchError::NonZeroExit { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "bad things");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_signal_termination_is_failure() {
        let result = LaunchResult {
            exit_code: None,
            ..LaunchResult::success()
        };
        assert!(result.rethrow_failure().is_err());
    }
}
