// Domain Layer - Task, envelope and launch models

pub mod envelope;
pub mod launch;
pub mod task;

// Re-exports
pub use envelope::{Envelope, EnvelopeStatus, CONTRACT_VERSION};
pub use launch::{Classpath, InvocationContract, LaunchOverrides, LaunchSpec, CLASSPATH_ENV};
pub use task::{OffloadTask, TaskFailure};
