// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod launcher;
pub mod resource_locator;
pub mod time_provider;
pub mod transport;

// Re-exports
pub use id_provider::IdProvider;
pub use launcher::{LaunchError, LaunchResult, Launcher};
pub use resource_locator::ResourceLocator;
pub use time_provider::TimeProvider;
pub use transport::{TaskChannel, Transport};
