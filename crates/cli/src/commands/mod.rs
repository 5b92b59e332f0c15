//! CLI command modules

pub mod serve;
pub mod worlds;

pub use serve::{execute_serve_command, ServeArgs};
pub use worlds::{create_world, list_worlds};
