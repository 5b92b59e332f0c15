//! Host world registry and execution context
//!
//! This crate models the game-server host that owns the worlds: the
//! [`WorldRegistry`] capability the control service is given, the
//! single-threaded [`HostExecutor`] every world operation runs on, and
//! [`DirectoryHost`], a registry backed by world directories on disk.

pub mod directory;
pub mod errors;
pub mod executor;
pub mod registry;
pub mod world;

// Re-export key types for easy access
pub use directory::DirectoryHost;
pub use errors::HostError;
pub use executor::{ExecutorError, HostExecutor};
pub use registry::WorldRegistry;
pub use world::{LevelData, World};

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;
