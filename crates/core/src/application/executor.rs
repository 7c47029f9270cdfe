// Offload Executor - parent side of the round trip
//
// open channel -> write pending -> launch child -> read outcome -> dispose
//
// The channel is disposed on every exit path: explicitly on the way out,
// and by the channel's Drop if anything in between returns early.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::serializer;
use crate::domain::{Classpath, Envelope, InvocationContract, LaunchOverrides, LaunchSpec, OffloadTask};
use crate::error::Result;
use crate::port::{Launcher, TaskChannel, Transport};

/// Run `task` in a child process and return the task the child wrote back.
///
/// `configure` may set the working directory, environment, extra
/// arguments and extra classpath entries. It cannot change the entry
/// point, the channel locator argument or the base classpath.
///
/// # Errors
/// - AppError::Serialization if the task cannot be encoded, or the child's output is not valid data
/// - AppError::LaunchFailure if the child could not be started or exited unsuccessfully
/// - AppError::TaskFailed if the child reported an error
/// - AppError::ProtocolViolation if the channel holds anything else
pub async fn execute<T, Tr, L, F>(
    task: T,
    contract: &InvocationContract,
    classpath: &Classpath,
    transport: &Tr,
    launcher: &L,
    configure: F,
) -> Result<T>
where
    T: OffloadTask,
    Tr: Transport + ?Sized,
    L: Launcher + ?Sized,
    F: FnOnce(&mut LaunchOverrides),
{
    let mut channel = transport.open()?;
    let locator = channel.locator();

    info!(
        kind = T::KIND,
        locator = ?locator,
        entry_point = %contract.entry_point.display(),
        "Offloading task"
    );

    let outcome = round_trip(&task, contract, classpath, &mut channel, launcher, configure).await;

    match outcome {
        Ok(done) => {
            channel.dispose()?;
            info!(kind = T::KIND, "Offloaded task completed");
            Ok(done)
        }
        Err(e) => {
            if let Err(cleanup) = channel.dispose() {
                warn!(locator = ?locator, error = %cleanup, "Failed to dispose task channel");
            }
            warn!(kind = T::KIND, error = %e, "Offloaded task failed");
            Err(e)
        }
    }
}

async fn round_trip<T, C, L, F>(
    task: &T,
    contract: &InvocationContract,
    classpath: &Classpath,
    channel: &mut C,
    launcher: &L,
    configure: F,
) -> Result<T>
where
    T: OffloadTask,
    C: TaskChannel,
    L: Launcher + ?Sized,
    F: FnOnce(&mut LaunchOverrides),
{
    channel.write_bytes(&serializer::encode(&Envelope::pending(task)?)?)?;

    let mut overrides = LaunchOverrides::default();
    configure(&mut overrides);
    let spec = LaunchSpec::new(contract, channel.locator(), classpath.clone()).apply(overrides);

    let result = launcher.launch(&spec).await?;
    debug!(
        exit_code = ?result.exit_code,
        duration_ms = result.duration_ms,
        "Child process exited"
    );
    result.rethrow_failure()?;

    let envelope = serializer::decode_envelope(&channel.read_bytes()?)?;
    debug!(status = %envelope.status(), kind = envelope.kind(), "Read task outcome");
    envelope.into_outcome()
}

/// Executor service bundling transport, launcher and launch defaults
pub struct OffloadExecutor<Tr: Transport> {
    transport: Tr,
    launcher: Arc<dyn Launcher>,
    contract: InvocationContract,
    classpath: Classpath,
}

impl<Tr: Transport> OffloadExecutor<Tr> {
    pub fn new(transport: Tr, launcher: Arc<dyn Launcher>, contract: InvocationContract) -> Self {
        Self {
            transport,
            launcher,
            contract,
            classpath: Classpath::new(),
        }
    }

    /// Base classpath every launch receives
    pub fn with_classpath(mut self, classpath: Classpath) -> Self {
        self.classpath = classpath;
        self
    }

    pub fn contract(&self) -> &InvocationContract {
        &self.contract
    }

    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    pub fn transport(&self) -> &Tr {
        &self.transport
    }

    /// See [`execute`]
    pub async fn execute<T, F>(&self, task: T, configure: F) -> Result<T>
    where
        T: OffloadTask,
        F: FnOnce(&mut LaunchOverrides),
    {
        execute(
            task,
            &self.contract,
            &self.classpath,
            &self.transport,
            self.launcher.as_ref(),
            configure,
        )
        .await
    }

    /// Execute with default launch settings
    pub async fn execute_default<T: OffloadTask>(&self, task: T) -> Result<T> {
        self.execute(task, |_| {}).await
    }
}
