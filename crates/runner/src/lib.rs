//! Offload Runner - child-side entry point
//!
//! The parent starts `offload-runner <channel-file> [extra args...]`. The
//! runner reads the pending task from the file, runs it, and overwrites the
//! file with the outcome.
//!
//! Exit codes:
//! - 0: an outcome (completed or failed) was written
//! - 1: the channel could not be read, parsed or written
//! - 2: usage error
//!
//! # Example
//!
//! ```no_run
//! use offload_core::application::TaskRegistry;
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     let mut registry = TaskRegistry::new();
//!     // registry.register::<MyTask>();
//!     offload_runner::run_main(registry)
//! }
//! ```

pub mod tasks;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use offload_core::application::{run_channel_file, TaskRegistry};
use offload_core::domain::{Classpath, EnvelopeStatus, CLASSPATH_ENV};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "offload_core=info,offload_runner=info";
pub const LOG_FORMAT_ENV: &str = "OFFLOAD_LOG_FORMAT";

pub const EXIT_CHANNEL_ERROR: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "offload-runner")]
#[command(about = "Runs one offloaded task from a channel file", long_about = None)]
#[command(version)]
pub struct RunnerArgs {
    /// Channel file written by the parent
    pub channel: PathBuf,

    /// Extra arguments added by the parent's launch configuration
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

/// Parse argv, set up logging, run the channel, map the outcome to an exit code
pub fn run_main(registry: TaskRegistry) -> ExitCode {
    let args = RunnerArgs::parse();
    init_logging();

    match run(&registry, &args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Runner failed");
            eprintln!("offload-runner: {:#}", e);
            ExitCode::from(EXIT_CHANNEL_ERROR)
        }
    }
}

/// Run the channel named by `args`
pub fn run(registry: &TaskRegistry, args: &RunnerArgs) -> Result<EnvelopeStatus> {
    info!(
        version = VERSION,
        channel = %args.channel.display(),
        extra_args = ?args.extra,
        kinds = ?registry.kinds(),
        "offload-runner starting"
    );

    run_channel_file(registry, &args.channel)
        .with_context(|| format!("failed to process channel {}", args.channel.display()))
}

/// Classpath the parent handed to this process
pub fn child_classpath() -> Classpath {
    std::env::var_os(CLASSPATH_ENV)
        .map(|value| Classpath::from_env_value(&value))
        .unwrap_or_default()
}

/// Structured logging to stderr; stdout is left to the tasks.
///
/// OFFLOAD_LOG_FORMAT=json selects JSON lines, anything else is pretty.
pub fn init_logging() {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let result = match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("offload-runner: logging already initialized: {}", e);
    }
}
