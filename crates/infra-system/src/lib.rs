// Offload Infrastructure - System Adapters
// Implements: Transport, Launcher, ResourceLocator (ADR-002)

pub mod config;
pub mod file_transport;
pub mod locators;
pub mod subprocess_launcher;

pub use config::LauncherConfig;
pub use file_transport::{FileChannel, FileTransport};
pub use locators::{discover_default_classpath, CurrentExeLocator, EnvPathLocator, ExplicitLocations};
pub use subprocess_launcher::SubprocessLauncher;
