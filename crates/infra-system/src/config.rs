// Launcher configuration (environment driven)
//
// OFFLOAD_RUNNER         path to the child entry point (default: offload-runner next to the current exe)
// OFFLOAD_TEMP_DIR       directory for channel files (default: system temp dir)
// OFFLOAD_ENV_ALLOWLIST  comma-separated parent env vars the child inherits

use std::path::PathBuf;
use std::sync::Arc;

use offload_core::domain::InvocationContract;
use offload_core::port::time_provider::SystemTimeProvider;
use offload_core::{AppError, OffloadExecutor, Result};

use crate::file_transport::FileTransport;
use crate::subprocess_launcher::SubprocessLauncher;

pub const RUNNER_ENV: &str = "OFFLOAD_RUNNER";
pub const TEMP_DIR_ENV: &str = "OFFLOAD_TEMP_DIR";
pub const ENV_ALLOWLIST_ENV: &str = "OFFLOAD_ENV_ALLOWLIST";

/// Binary name of the default child entry point
pub const DEFAULT_RUNNER_NAME: &str = "offload-runner";

/// Parent env vars inherited by the child unless configured otherwise
pub const DEFAULT_ENV_ALLOWLIST: &[&str] = &["PATH", "HOME", "USER", "RUST_LOG", "RUST_BACKTRACE"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub runner: PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub env_allowlist: Vec<String>,
}

impl LauncherConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let runner = match lookup(RUNNER_ENV) {
            Some(path) => expand(&path),
            None => default_runner()?,
        };

        let temp_dir = lookup(TEMP_DIR_ENV)
            .filter(|s| !s.trim().is_empty())
            .map(|s| expand(&s));

        let env_allowlist = match lookup(ENV_ALLOWLIST_ENV) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            runner,
            temp_dir,
            env_allowlist,
        })
    }

    pub fn contract(&self) -> InvocationContract {
        InvocationContract::new(&self.runner)
    }

    /// Executor wired from this config: temp-file channels in `temp_dir`,
    /// a subprocess launcher with `env_allowlist`, and `runner` as entry point
    pub fn executor(&self) -> OffloadExecutor<FileTransport> {
        OffloadExecutor::new(
            FileTransport::from_config(self),
            Arc::new(SubprocessLauncher::from_config(Arc::new(SystemTimeProvider), self)),
            self.contract(),
        )
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn default_runner() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| AppError::Config(format!("cannot resolve current executable: {}", e)))?;
    let dir = exe
        .parent()
        .ok_or_else(|| AppError::Config(format!("{} has no parent directory", exe.display())))?;

    Ok(dir.join(format!("{}{}", DEFAULT_RUNNER_NAME, std::env::consts::EXE_SUFFIX)))
}
