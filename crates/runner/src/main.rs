//! offload-runner binary with the built-in task set

use std::process::ExitCode;

fn main() -> ExitCode {
    offload_runner::run_main(offload_runner::tasks::registry())
}
