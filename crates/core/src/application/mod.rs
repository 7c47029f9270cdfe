// Application Layer - Use Cases

pub mod child;
pub mod classpath;
pub mod executor;
pub mod panic_guard;
pub mod serializer;

// Re-exports
pub use child::{run_channel_file, TaskRegistry};
pub use classpath::discover_required_classpath;
pub use executor::{execute, OffloadExecutor};
