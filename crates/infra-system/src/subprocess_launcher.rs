// Subprocess launcher implementation
// reason: async-trait, tokio for async process management (ADR-001)
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::info;

use offload_core::domain::{LaunchSpec, CLASSPATH_ENV};
use offload_core::port::{LaunchError, LaunchResult, Launcher, TimeProvider};

use crate::config::LauncherConfig;

/// Subprocess launcher
/// Spawns the child entry point with environment allowlisting (ADR-040)
pub struct SubprocessLauncher {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
}

impl SubprocessLauncher {
    /// Create a new subprocess launcher
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    /// * `env_allowlist` - Parent env vars the child may inherit (security constraint, ADR-040)
    ///
    /// # Example
    /// ```ignore
    /// let launcher = SubprocessLauncher::new(
    ///     Arc::new(SystemTimeProvider),
    ///     vec!["PATH".to_string(), "HOME".to_string()],
    /// );
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>, env_allowlist: Vec<String>) -> Self {
        Self {
            time_provider,
            env_allowlist,
        }
    }

    pub fn from_config(time_provider: Arc<dyn TimeProvider>, config: &LauncherConfig) -> Self {
        Self::new(time_provider, config.env_allowlist.clone())
    }

    /// Parent env filtered to the allowlist (ADR-040)
    /// Raw OS strings: values need not be UTF-8
    fn inherited_env(&self) -> BTreeMap<OsString, OsString> {
        self.filter_env(std::env::vars_os())
    }

    fn filter_env<I>(&self, env: I) -> BTreeMap<OsString, OsString>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        env.into_iter()
            .filter(|(k, _)| self.env_allowlist.iter().any(|allowed| k.as_os_str() == allowed.as_str()))
            .collect()
    }

    /// Build the command: clean env, allowlisted parent env, classpath, then caller env
    fn build_command(&self, spec: &LaunchSpec) -> Result<Command, LaunchError> {
        let classpath = spec
            .classpath
            .to_env_value()
            .map_err(|e| LaunchError::SpawnFailed(e.to_string()))?;

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .env_clear()
            .envs(self.inherited_env())
            .env(CLASSPATH_ENV, classpath)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        Ok(command)
    }

    /// Build launch result from process output
    fn build_result(&self, output: std::process::Output, duration_ms: i64) -> LaunchResult {
        LaunchResult {
            exit_code: output.status.code(),
            duration_ms,
            stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        }
    }
}

#[async_trait]
impl Launcher for SubprocessLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<LaunchResult, LaunchError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %spec.program.display(),
            args = ?spec.args,
            working_dir = ?spec.working_dir,
            classpath_entries = spec.classpath.len(),
            "Starting child process"
        );

        let child = self
            .build_command(spec)?
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(format!("{}: {}", spec.program.display(), e)))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| LaunchError::IoError(e.to_string()))?;

        let duration_ms = self.time_provider.elapsed_since(start_time);
        let result = self.build_result(output, duration_ms);

        info!(
            program = %spec.program.display(),
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            "Child process completed"
        );

        Ok(result)
    }
}
