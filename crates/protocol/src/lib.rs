//! Worldctl protocol types
//!
//! This crate defines the command kinds accepted by the world control service
//! and the fixed HTTP surface (methods, paths, port and greeting) they map to.

pub mod commands;

pub use commands::{Command, Method};

/// Port the control service listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 8085;

/// Body returned by the liveness route
pub const GREETING: &str = "Hello, Minecraft Javalin Plugin!";

/// Path of the liveness route
pub const GREETING_PATH: &str = "/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_surface() {
        assert_eq!(DEFAULT_PORT, 8085);
        assert_eq!(GREETING, "Hello, Minecraft Javalin Plugin!");
        assert!(Command::all().iter().all(|c| c.path() != GREETING_PATH));
    }
}
