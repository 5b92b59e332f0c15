//! HTTP server for the world control service.
//!
//! Binds the liveness route and one route per [`Command`], then serves until
//! shutdown is requested. The listener drains before the host is shut down,
//! so the response acknowledging `/shutdown` is written before the host
//! stops.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, on, MethodFilter};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};
use worldctl_protocol::{Command, Method, DEFAULT_PORT, GREETING, GREETING_PATH};

use crate::control::{ControlError, WorldControl};

/// Configuration for the control HTTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

/// HTTP server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind control listener on {addr}: {source}")]
    Bind { addr: SocketAddr, source: std::io::Error },

    #[error("Control listener failed: {source}")]
    Serve { source: std::io::Error },

    #[error("Host shutdown failed: {source}")]
    Shutdown { source: ControlError },
}

/// Build the control router over a shared [`WorldControl`]
pub fn router(control: Arc<WorldControl>) -> Router {
    Command::all()
        .into_iter()
        .fold(
            Router::<Arc<WorldControl>>::new().route(GREETING_PATH, get(greeting)),
            |router, command| {
                router.route(
                    command.path(),
                    on(
                        method_filter(command),
                        move |State(control): State<Arc<WorldControl>>| {
                            handle_command(control, command)
                        },
                    ),
                )
            },
        )
        .with_state(control)
}

fn method_filter(command: Command) -> MethodFilter {
    match command.method() {
        Method::Get => MethodFilter::GET,
        Method::Put => MethodFilter::PUT,
    }
}

async fn greeting() -> &'static str {
    GREETING
}

async fn handle_command(
    control: Arc<WorldControl>,
    command: Command,
) -> Result<StatusCode, ControlError> {
    match command {
        Command::Save => {
            control.save_all().await?;
        }
        Command::Load => {
            control.load_all().await?;
        }
        Command::Unload => {
            control.unload_all().await?;
        }
        // Only flips the flag; the host stops after the listener drains.
        Command::Shutdown => {
            if !control.request_shutdown() {
                debug!("Shutdown already in progress");
            }
        }
    }
    Ok(StatusCode::OK)
}

/// World control HTTP server
pub struct HttpServer {
    config: ServerConfig,
    control: Arc<WorldControl>,
}

impl HttpServer {
    /// Creates a new [`HttpServer`] serving `control`.
    pub fn new(config: ServerConfig, control: Arc<WorldControl>) -> Self {
        Self { config, control }
    }

    /// Access the configuration associated with this server.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the listener without serving yet.
    ///
    /// Fails fast with [`ServerError::Bind`] when the port is taken.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!("Control listener bound on {}", addr);
        Ok(BoundServer {
            listener,
            control: self.control,
        })
    }
}

/// A server whose listener is bound and ready to accept
pub struct BoundServer {
    listener: TcpListener,
    control: Arc<WorldControl>,
}

impl BoundServer {
    /// Address actually bound, useful when binding port 0
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until shutdown is requested, drain, then shut the host down
    pub async fn serve(self) -> Result<(), ServerError> {
        let app = router(self.control.clone());
        let signal = {
            let control = self.control.clone();
            async move { control.shutdown_requested().await }
        };

        axum::serve(self.listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|source| ServerError::Serve { source })?;

        info!("Control listener drained; shutting down host");
        self.control
            .finish_shutdown()
            .await
            .map_err(|source| ServerError::Shutdown { source })
    }
}
