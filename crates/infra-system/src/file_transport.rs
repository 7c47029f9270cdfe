// File-backed transport: one uniquely named temp file per invocation
// reason: tempfile gives unique names and delete-on-drop (ADR-002)

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::debug;

use offload_core::port::{TaskChannel, Transport};
use offload_core::Result;

use crate::config::LauncherConfig;

const CHANNEL_PREFIX: &str = "offload-";
const CHANNEL_SUFFIX: &str = ".task";

/// Creates task channels as temp files
#[derive(Debug, Clone, Default)]
pub struct FileTransport {
    /// None = system temp dir
    dir: Option<PathBuf>,
}

impl FileTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place channel files in `dir` instead of the system temp dir
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Honour `OFFLOAD_TEMP_DIR` when it was configured
    pub fn from_config(config: &LauncherConfig) -> Self {
        match &config.temp_dir {
            Some(dir) => Self::in_dir(dir),
            None => Self::new(),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl Transport for FileTransport {
    type Channel = FileChannel;

    fn open(&self) -> Result<FileChannel> {
        let mut builder = Builder::new();
        builder.prefix(CHANNEL_PREFIX).suffix(CHANNEL_SUFFIX);

        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        // Close our handle; the child reopens the file by path
        let path = file.into_temp_path();
        debug!(path = %path.display(), "Opened task channel");

        Ok(FileChannel { path })
    }
}

/// Temp-file channel. The file is removed on dispose or drop.
#[derive(Debug)]
pub struct FileChannel {
    path: TempPath,
}

impl FileChannel {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskChannel for FileChannel {
    fn locator(&self) -> OsString {
        self.path.as_os_str().to_os_string()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(&self.path, bytes)
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn dispose(self) -> io::Result<()> {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => {
                debug!(path = %shown, "Disposed task channel");
                Ok(())
            }
            // Child removed it already; nothing left to clean up
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
