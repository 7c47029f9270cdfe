// Resource Locator Port
// A marker that can tell where the resources the child needs live.

use std::path::PathBuf;

use crate::error::Result;

/// Source of resource locations for the child's classpath
///
/// # Errors
/// `locations` returns AppError::EnvironmentAssumption when the locator
/// cannot work in the current environment (missing env var, unknown
/// executable path, ...). That is not recoverable by the caller.
pub trait ResourceLocator: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Locations this marker was loaded from, in priority order
    fn locations(&self) -> Result<Vec<PathBuf>>;
}
