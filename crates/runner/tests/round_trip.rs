//! End-to-end round trips through the real offload-runner binary
//!
//! Parent: FileTransport + SubprocessLauncher. Child: the built runner.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use offload_core::domain::{Classpath, InvocationContract};
use offload_core::port::time_provider::SystemTimeProvider;
use offload_core::port::LaunchError;
use offload_core::{AppError, OffloadExecutor, OffloadTask, TaskFailure};
use offload_infra_system::config::{ENV_ALLOWLIST_ENV, RUNNER_ENV, TEMP_DIR_ENV};
use offload_infra_system::{FileTransport, LauncherConfig, SubprocessLauncher};
use offload_runner::tasks::{ClasspathProbe, Exit, Explode, Fail, FileDigest, WordCount};

const RUNNER: &str = env!("CARGO_BIN_EXE_offload-runner");

fn executor(channel_dir: &Path) -> OffloadExecutor<FileTransport> {
    let launcher = SubprocessLauncher::new(Arc::new(SystemTimeProvider), vec!["PATH".to_string()]);
    OffloadExecutor::new(
        FileTransport::in_dir(channel_dir),
        Arc::new(launcher),
        InvocationContract::new(RUNNER),
    )
}

fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_word_count_round_trip() {
    let channels = tempfile::tempdir().unwrap();
    let executor = executor(channels.path());

    let done = executor
        .execute_default(WordCount::new("the quick brown\nfox"))
        .await
        .unwrap();

    assert_eq!(done.words, Some(4));
    assert_eq!(done.lines, Some(2));
    assert_eq!(leftover_files(channels.path()), 0);
}

#[tokio::test]
async fn test_task_failure_propagated() {
    let channels = tempfile::tempdir().unwrap();
    let executor = executor(channels.path());

    let err = executor
        .execute_default(Fail {
            message: "incompatible toolchain".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        AppError::TaskFailed(failure) => {
            assert_eq!(failure.kind, "requested");
            assert_eq!(failure.message, "incompatible toolchain");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(leftover_files(channels.path()), 0);
}

#[tokio::test]
async fn test_panic_reported_as_failure() {
    let channels = tempfile::tempdir().unwrap();
    let executor = executor(channels.path());

    let err = executor
        .execute_default(Explode {
            message: "kaboom".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        AppError::TaskFailed(failure) => {
            assert_eq!(failure.kind, "panic");
            assert_eq!(failure.message, "kaboom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(leftover_files(channels.path()), 0);
}

#[tokio::test]
async fn test_child_exit_is_launch_failure() {
    let channels = tempfile::tempdir().unwrap();
    let executor = executor(channels.path());

    let err = executor.execute_default(Exit { code: 3 }).await.unwrap_err();

    match err {
        AppError::LaunchFailure(LaunchError::NonZeroExit { code, .. }) => assert_eq!(code, Some(3)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(leftover_files(channels.path()), 0);
}

#[tokio::test]
async fn test_missing_runner_is_launch_failure() {
    let channels = tempfile::tempdir().unwrap();
    let launcher = SubprocessLauncher::new(Arc::new(SystemTimeProvider), vec![]);
    let executor = OffloadExecutor::new(
        FileTransport::in_dir(channels.path()),
        Arc::new(launcher),
        InvocationContract::new(channels.path().join("no-such-runner")),
    );

    let err = executor.execute_default(WordCount::new("x")).await.unwrap_err();

    assert!(matches!(err, AppError::LaunchFailure(LaunchError::SpawnFailed(_))));
    assert_eq!(leftover_files(channels.path()), 0);
}

#[tokio::test]
async fn test_unregistered_kind_reported_by_child() {
    #[derive(Debug, Serialize, Deserialize)]
    struct NotShipped {
        value: u8,
    }

    impl OffloadTask for NotShipped {
        const KIND: &'static str = "not_shipped";

        fn run(&mut self) -> Result<(), TaskFailure> {
            Ok(())
        }
    }

    let channels = tempfile::tempdir().unwrap();
    let executor = executor(channels.path());

    let err = executor.execute_default(NotShipped { value: 1 }).await.unwrap_err();

    match err {
        AppError::TaskFailed(failure) => assert_eq!(failure.kind, "unknown_task"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_classpath_env_and_working_dir_reach_child() {
    let channels = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let base: Classpath = ["/opt/offload/lib", "/opt/host/api"].into_iter().collect();
    let executor = executor(channels.path()).with_classpath(base);

    let probe = ClasspathProbe {
        env_var: Some("OFFLOAD_E2E_MARKER".to_string()),
        ..ClasspathProbe::default()
    };

    let done = executor
        .execute(probe, |o| {
            o.env("OFFLOAD_E2E_MARKER", "present")
                .classpath_entry("/opt/plugins")
                .classpath_entry("/opt/offload/lib")
                .current_dir(work.path())
                .arg("--ignored-by-runner");
        })
        .await
        .unwrap();

    assert_eq!(
        done.entries,
        vec![
            PathBuf::from("/opt/offload/lib"),
            PathBuf::from("/opt/host/api"),
            PathBuf::from("/opt/plugins"),
        ]
    );
    assert_eq!(done.env_value.as_deref(), Some("present"));
    assert_eq!(
        std::fs::canonicalize(done.working_dir.unwrap()).unwrap(),
        std::fs::canonicalize(work.path()).unwrap()
    );
    assert_eq!(leftover_files(channels.path()), 0);
}

#[tokio::test]
async fn test_relative_path_resolved_in_child_working_dir() {
    let channels = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    std::fs::write(work.path().join("input.bin"), b"a").unwrap();

    let done = executor(channels.path())
        .execute(FileDigest::new("input.bin"), |o| {
            o.current_dir(work.path());
        })
        .await
        .unwrap();

    assert_eq!(done.bytes, Some(1));
    assert_eq!(done.fnv1a.as_deref(), Some("af63dc4c8601ec8c"));
}

#[tokio::test]
async fn test_executor_from_config_uses_configured_dir_and_runner() {
    let channels = tempfile::tempdir().unwrap();
    let temp = channels.path().to_string_lossy().to_string();
    let config = LauncherConfig::from_lookup(|key| match key {
        RUNNER_ENV => Some(RUNNER.to_string()),
        TEMP_DIR_ENV => Some(temp.clone()),
        ENV_ALLOWLIST_ENV => Some("PATH".to_string()),
        _ => None,
    })
    .unwrap();
    let executor = config.executor();

    let done = executor
        .execute(WordCount::new("one two three"), |_| {})
        .await
        .unwrap();

    assert_eq!(done.words, Some(3));
    assert_eq!(executor.transport().dir(), Some(channels.path()));
    assert_eq!(leftover_files(channels.path()), 0);
}
