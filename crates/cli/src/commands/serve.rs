//! Serve command implementation
//!
//! This module implements the `worldctl serve` command: open the worlds
//! directory, start the host execution context and run the control listener
//! until `/shutdown` or a termination signal.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use worldctl_adapters::{HttpServer, WorldControl};
use worldctl_host::{DirectoryHost, HostExecutor};

use crate::config::AppConfig;
use crate::logging::setup_logging;

/// Arguments for the serve command
#[derive(Debug, Default)]
pub struct ServeArgs {
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Bind address override
    pub bind: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Worlds directory override
    pub worlds_dir: Option<PathBuf>,
    /// Skip loading worlds at startup
    pub no_autoload: bool,
    /// Log level override
    pub log_level: Option<String>,
    /// Force JSON logs
    pub log_json: bool,
}

/// Resolve the effective configuration: file first, then flags
pub async fn resolve_config(args: &ServeArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path).await?,
        None => AppConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.server.bind_address = bind.clone();
    }
    if let Some(port) = args.port {
        config.set_port(port)?;
    }
    if let Some(dir) = &args.worlds_dir {
        config.host.worlds_dir = dir.clone();
    }
    if args.no_autoload {
        config.host.autoload = false;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.log_json {
        config.logging.json_format = true;
    }

    config.validate()?;
    Ok(config)
}

/// Execute the serve command
pub async fn execute_serve_command(args: ServeArgs) -> Result<()> {
    let config = resolve_config(&args).await?;
    setup_logging(&config.logging)?;

    println!("🌍 Starting world control service...");
    println!("📁 Worlds: {}", config.host.worlds_dir.display());
    println!("🔌 Address: {}", config.server.bind_address);
    println!();

    let host = DirectoryHost::open(&config.host.worlds_dir, config.host.autoload)
        .with_context(|| format!("Failed to open worlds directory: {}", config.host.worlds_dir.display()))?;
    let executor = HostExecutor::spawn(host).context("Failed to start host execution context")?;
    let control = Arc::new(WorldControl::new(executor));

    let server = HttpServer::new(config.to_server_config()?, control.clone())
        .bind()
        .await
        .context("Failed to start control listener")?;

    println!("📡 Listening on: {}", server.local_addr()?);
    println!("🔄 Service running... PUT /shutdown or press Ctrl+C to stop");

    let signals = {
        let control = control.clone();
        tokio::spawn(async move {
            match wait_for_shutdown().await {
                Ok(()) => {
                    info!("Termination signal received");
                    control.request_shutdown();
                }
                Err(e) => warn!("Signal handling unavailable: {}", e),
            }
        })
    };

    let result = server.serve().await;
    signals.abort();
    result.context("Control service failed")?;

    println!("✅ Host shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    Ok(())
}
