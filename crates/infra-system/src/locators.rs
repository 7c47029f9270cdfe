// ResourceLocator implementations
//
// Explicit, caller-visible sources of classpath entries; nothing is
// inferred by introspecting how code was loaded.

use std::path::PathBuf;

use offload_core::application::discover_required_classpath;
use offload_core::domain::{Classpath, CLASSPATH_ENV};
use offload_core::port::ResourceLocator;
use offload_core::{AppError, Result};

/// Fixed list supplied by the caller
pub struct ExplicitLocations {
    name: String,
    locations: Vec<PathBuf>,
}

impl ExplicitLocations {
    pub fn new<I, P>(name: impl Into<String>, locations: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            name: name.into(),
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceLocator for ExplicitLocations {
    fn name(&self) -> &str {
        &self.name
    }

    fn locations(&self) -> Result<Vec<PathBuf>> {
        Ok(self.locations.clone())
    }
}

/// Platform path list read from an environment variable
pub struct EnvPathLocator {
    var: String,
    required: bool,
}

impl EnvPathLocator {
    /// Missing variable is an environment assumption violation
    pub fn required(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            required: true,
        }
    }

    /// Missing variable yields no locations
    pub fn optional(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            required: false,
        }
    }
}

impl ResourceLocator for EnvPathLocator {
    fn name(&self) -> &str {
        &self.var
    }

    fn locations(&self) -> Result<Vec<PathBuf>> {
        match std::env::var_os(&self.var) {
            Some(value) => Ok(Classpath::from_env_value(&value).entries().to_vec()),
            None if self.required => Err(AppError::EnvironmentAssumption(format!(
                "environment variable {} is not set",
                self.var
            ))),
            None => Ok(Vec::new()),
        }
    }
}

/// Directory holding the running executable (where sibling binaries live)
pub struct CurrentExeLocator;

impl ResourceLocator for CurrentExeLocator {
    fn name(&self) -> &str {
        "current_exe"
    }

    fn locations(&self) -> Result<Vec<PathBuf>> {
        let exe = std::env::current_exe().map_err(|e| {
            AppError::EnvironmentAssumption(format!("cannot resolve current executable: {}", e))
        })?;

        let dir = exe.parent().ok_or_else(|| {
            AppError::EnvironmentAssumption(format!("{} has no parent directory", exe.display()))
        })?;

        Ok(vec![dir.to_path_buf()])
    }
}

/// Executable directory first, then whatever the parent itself was given in
/// OFFLOAD_CLASSPATH
pub fn discover_default_classpath() -> Result<Classpath> {
    let inherited = EnvPathLocator::optional(CLASSPATH_ENV);
    discover_required_classpath(&[&CurrentExeLocator, &inherited])
}
