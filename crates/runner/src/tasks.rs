// Built-in tasks shipped with the stock runner binary

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use offload_core::application::TaskRegistry;
use offload_core::{OffloadTask, TaskFailure};

/// Registry used by the `offload-runner` binary
pub fn registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry
        .register::<WordCount>()
        .register::<FileDigest>()
        .register::<ClasspathProbe>()
        .register::<Fail>()
        .register::<Explode>()
        .register::<Exit>();
    registry
}

/// Count words and lines of a text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordCount {
    pub text: String,
    pub words: Option<usize>,
    pub lines: Option<usize>,
}

impl WordCount {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl OffloadTask for WordCount {
    const KIND: &'static str = "word_count";

    fn run(&mut self) -> Result<(), TaskFailure> {
        self.words = Some(self.text.split_whitespace().count());
        self.lines = Some(self.text.lines().count());
        Ok(())
    }
}

/// Size and FNV-1a hash of a file, resolved against the child's working dir
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileDigest {
    pub path: PathBuf,
    pub bytes: Option<u64>,
    pub fnv1a: Option<String>,
}

impl FileDigest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl OffloadTask for FileDigest {
    const KIND: &'static str = "file_digest";

    fn run(&mut self) -> Result<(), TaskFailure> {
        let data = std::fs::read(&self.path).map_err(|e| {
            TaskFailure::from_error(e).with_cause(format!("reading {}", self.path.display()))
        })?;

        let hash = data
            .iter()
            .fold(FNV_OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME));

        self.bytes = Some(data.len() as u64);
        self.fnv1a = Some(format!("{:016x}", hash));
        Ok(())
    }
}

/// Reports the classpath and one env var as seen by the child
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClasspathProbe {
    pub env_var: Option<String>,
    pub entries: Vec<PathBuf>,
    pub env_value: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl OffloadTask for ClasspathProbe {
    const KIND: &'static str = "classpath_probe";

    fn run(&mut self) -> Result<(), TaskFailure> {
        self.entries = crate::child_classpath().entries().to_vec();
        self.env_value = self.env_var.as_ref().and_then(|var| std::env::var(var).ok());
        self.working_dir = Some(std::env::current_dir().map_err(TaskFailure::from_error)?);
        Ok(())
    }
}

/// Always fails with the given message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fail {
    pub message: String,
}

impl OffloadTask for Fail {
    const KIND: &'static str = "fail";

    fn run(&mut self) -> Result<(), TaskFailure> {
        Err(TaskFailure::new("requested", self.message.clone()))
    }
}

/// Always panics with the given message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explode {
    pub message: String,
}

impl OffloadTask for Explode {
    const KIND: &'static str = "explode";

    fn run(&mut self) -> Result<(), TaskFailure> {
        panic!("{}", self.message);
    }
}

/// Terminates the child without writing an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub code: i32,
}

impl OffloadTask for Exit {
    const KIND: &'static str = "exit";

    fn run(&mut self) -> Result<(), TaskFailure> {
        std::process::exit(self.code);
    }
}
