//! Configuration management for the worldctl service.
//!
//! Settings are loaded from a TOML file, then overridden by command-line
//! flags. Every field has a default, so an empty file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;
use worldctl_adapters::ServerConfig;
use worldctl_protocol::DEFAULT_PORT;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn default_bind_address() -> String {
    format!("0.0.0.0:{}", DEFAULT_PORT)
}

fn default_worlds_dir() -> PathBuf {
    PathBuf::from("worlds")
}

fn default_autoload() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Host world settings
    #[serde(default)]
    pub host: HostSettings,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind the control listener to (e.g. "0.0.0.0:8085")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind_address: default_bind_address() }
    }
}

/// Host world settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Directory holding one folder per world
    #[serde(default = "default_worlds_dir")]
    pub worlds_dir: PathBuf,
    /// Load every known world at startup
    #[serde(default = "default_autoload")]
    pub autoload: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            worlds_dir: default_worlds_dir(),
            autoload: default_autoload(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Base level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration there and
    /// returns it.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Checks the bind address and log level
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    /// Parsed listener address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind_address.parse().with_context(|| {
            format!(
                "Invalid bind address '{}'. Expected format: IP:PORT (e.g., 0.0.0.0:{})",
                self.server.bind_address, DEFAULT_PORT
            )
        })
    }

    /// Converts the settings into the HTTP server's configuration
    pub fn to_server_config(&self) -> Result<ServerConfig> {
        Ok(ServerConfig { bind_addr: self.bind_addr()? })
    }

    /// Replace the port of the bind address
    pub fn set_port(&mut self, port: u16) -> Result<()> {
        let mut addr = self.bind_addr()?;
        addr.set_port(port);
        self.server.bind_address = addr.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:8085");
        assert_eq!(config.host.worlds_dir, PathBuf::from("worlds"));
        assert!(config.host.autoload);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[host]
worlds_dir = "/srv/minecraft"
"#,
        )
        .unwrap();

        assert_eq!(config.host.worlds_dir, PathBuf::from("/srv/minecraft"));
        assert!(config.host.autoload);
        assert_eq!(config.server.bind_address, "0.0.0.0:8085");
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("worldctl.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded, config);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("worldctl.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
bind_address = "127.0.0.1:9085"

[host]
worlds_dir = "data/worlds"
autoload = false

[logging]
level = "debug"
json_format = true
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9085");
        assert!(!config.host.autoload);
        assert!(config.logging.json_format);
        assert_eq!(config.to_server_config().unwrap().bind_addr.port(), 9085);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.bind_address = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_port() {
        let mut config = AppConfig::default();
        config.set_port(9000).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
    }
}
