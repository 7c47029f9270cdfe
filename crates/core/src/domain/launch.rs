// Launch Domain Model
//
// What the parent asks the launcher to run. Defaults are fixed by the
// executor; callers only get to extend them through LaunchOverrides.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::envelope::CONTRACT_VERSION;
use crate::error::{AppError, Result};

/// Environment variable the child reads its classpath from
pub const CLASSPATH_ENV: &str = "OFFLOAD_CLASSPATH";

/// Insertion-ordered, deduplicated list of resource locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a location; returns false if it was already present
    pub fn push(&mut self, entry: impl Into<PathBuf>) -> bool {
        let entry = entry.into();
        if self.seen.contains(&entry) {
            return false;
        }
        self.seen.insert(entry.clone());
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &Path) -> bool {
        self.seen.contains(entry)
    }

    /// Join into a platform path list (`:` on unix, `;` on windows)
    pub fn to_env_value(&self) -> Result<OsString> {
        std::env::join_paths(&self.entries)
            .map_err(|e| AppError::Config(format!("classpath entry not representable: {}", e)))
    }

    /// Parse a platform path list, skipping empty segments
    pub fn from_env_value(value: &std::ffi::OsStr) -> Self {
        std::env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for Classpath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut classpath = Classpath::new();
        classpath.extend(iter);
        classpath
    }
}

impl<P: Into<PathBuf>> Extend<P> for Classpath {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// Explicit parent/child invocation contract.
///
/// The child is always started as `<entry_point> <channel-locator>`; the
/// locator is the only positional argument it is required to understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContract {
    pub entry_point: PathBuf,
    pub version: u32,
}

impl InvocationContract {
    pub fn new(entry_point: impl Into<PathBuf>) -> Self {
        Self {
            entry_point: entry_point.into(),
            version: CONTRACT_VERSION,
        }
    }
}

/// Fully resolved process launch parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    /// Channel locator first, caller extras after
    pub args: Vec<OsString>,
    pub classpath: Classpath,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Build the fixed part of a launch: entry point, locator, base classpath
    pub fn new(contract: &InvocationContract, locator: impl Into<OsString>, classpath: Classpath) -> Self {
        Self {
            program: contract.entry_point.clone(),
            args: vec![locator.into()],
            classpath,
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Apply caller overrides on top of the defaults.
    ///
    /// Overrides can only add arguments after the locator, add classpath
    /// entries, set env vars and set the working directory.
    pub fn apply(mut self, overrides: LaunchOverrides) -> Self {
        self.args.extend(overrides.extra_args);
        self.classpath.extend(overrides.extra_classpath);
        self.env.extend(overrides.env);
        if overrides.working_dir.is_some() {
            self.working_dir = overrides.working_dir;
        }
        self
    }

    /// The channel locator handed to the child
    pub fn locator(&self) -> Option<&OsString> {
        self.args.first()
    }
}

/// Caller-adjustable launch settings
#[derive(Debug, Clone, Default)]
pub struct LaunchOverrides {
    working_dir: Option<PathBuf>,
    extra_args: Vec<OsString>,
    extra_classpath: Vec<PathBuf>,
    env: BTreeMap<String, String>,
}

impl LaunchOverrides {
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn classpath_entry(&mut self, entry: impl Into<PathBuf>) -> &mut Self {
        self.extra_classpath.push(entry.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classpath_dedup_keeps_first_seen_order() {
        let classpath: Classpath = ["/b", "/a", "/b", "/c", "/a"].into_iter().collect();

        assert_eq!(
            classpath.entries(),
            &[PathBuf::from("/b"), PathBuf::from("/a"), PathBuf::from("/c")]
        );
    }

    #[test]
    fn test_classpath_env_value_round_trip() {
        let classpath: Classpath = ["/opt/one", "/opt/two"].into_iter().collect();
        let value = classpath.to_env_value().unwrap();

        assert_eq!(Classpath::from_env_value(&value), classpath);
    }

    #[test]
    fn test_overrides_cannot_displace_defaults() {
        let contract = InvocationContract::new("/usr/bin/offload-runner");
        let base: Classpath = ["/lib/base"].into_iter().collect();

        let mut overrides = LaunchOverrides::default();
        overrides
            .arg("--verbose")
            .env("MODE", "fast")
            .current_dir("/work")
            .classpath_entry("/lib/extra")
            .classpath_entry("/lib/base");

        let spec = LaunchSpec::new(&contract, "/tmp/offload-1.task", base).apply(overrides);

        assert_eq!(spec.program, PathBuf::from("/usr/bin/offload-runner"));
        assert_eq!(spec.locator(), Some(&OsString::from("/tmp/offload-1.task")));
        assert_eq!(spec.args.len(), 2);
        assert_eq!(spec.args[1], OsString::from("--verbose"));
        assert_eq!(
            spec.classpath.entries(),
            &[PathBuf::from("/lib/base"), PathBuf::from("/lib/extra")]
        );
        assert_eq!(spec.env.get("MODE").map(String::as_str), Some("fast"));
        assert_eq!(spec.working_dir, Some(PathBuf::from("/work")));
    }
}
