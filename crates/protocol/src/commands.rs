//! Command kinds and their HTTP routes.
//!
//! Every request the control service accepts is one of four fixed commands.
//! A command carries no payload and has no identity beyond its kind.

use std::fmt;

/// HTTP methods used by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    /// Upper-case wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A world control command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Save every loaded world
    Save,
    /// Recreate and register every known world
    Load,
    /// Unload every loaded world, forcing a save
    Unload,
    /// Terminate the host
    Shutdown,
}

impl Command {
    /// Get all commands in route-table order
    pub fn all() -> [Command; 4] {
        [Command::Save, Command::Load, Command::Unload, Command::Shutdown]
    }

    /// Lower-case name, also the last path segment
    pub fn name(&self) -> &'static str {
        match self {
            Command::Save => "save",
            Command::Load => "load",
            Command::Unload => "unload",
            Command::Shutdown => "shutdown",
        }
    }

    /// HTTP path of the command's route
    pub fn path(&self) -> &'static str {
        match self {
            Command::Save => "/save",
            Command::Load => "/load",
            Command::Unload => "/unload",
            Command::Shutdown => "/shutdown",
        }
    }

    /// HTTP method of the command's route.
    ///
    /// `save` is a GET for compatibility with existing callers even though
    /// it has side effects.
    pub fn method(&self) -> Method {
        match self {
            Command::Save => Method::Get,
            Command::Load | Command::Unload | Command::Shutdown => Method::Put,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
