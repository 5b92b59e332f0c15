//! World control service.
//!
//! Translates the four control commands into host work, runs that work on
//! the host execution context and waits for it to finish before reporting.
//! World-set operations pass a single-flight gate so two requests never
//! interleave their batches.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};
use worldctl_host::{ExecutorError, HostError, HostExecutor, WorldRegistry};
use worldctl_protocol::Command;

/// Errors reported to control clients
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("{command} failed for world '{world}': {source}")]
    HostOperation {
        command: Command,
        world: String,
        source: HostError,
    },

    #[error("{command} failed: {source}")]
    Host { command: Command, source: HostError },

    #[error("Host execution context unavailable: {source}")]
    Executor { source: ExecutorError },

    #[error("Host is shutting down")]
    ShuttingDown,
}

impl From<ExecutorError> for ControlError {
    fn from(err: ExecutorError) -> Self {
        ControlError::Executor { source: err }
    }
}

impl ControlError {
    fn world(command: Command, world: &str, source: HostError) -> Self {
        ControlError::HostOperation {
            command,
            world: world.to_string(),
            source,
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            ControlError::HostOperation { .. } | ControlError::Host { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ControlError::Executor { source: ExecutorError::Aborted } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ControlError::Executor { .. } | ControlError::ShuttingDown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Outcome of a completed world command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    /// Command that ran
    pub command: Command,
    /// Worlds it touched, in the order they were processed
    pub worlds: Vec<String>,
}

type Batch = Result<Vec<String>, ControlError>;

/// The control-plane service shared by every request handler
#[derive(Debug)]
pub struct WorldControl {
    /// Execution context owning the host registry
    executor: HostExecutor,
    /// Held while a world-set batch is in flight
    mutation_gate: Mutex<()>,
    /// Flips to `true` once shutdown has been requested
    shutdown: watch::Sender<bool>,
}

impl WorldControl {
    /// Create a control service over the given host execution context
    pub fn new(executor: HostExecutor) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            executor,
            mutation_gate: Mutex::new(()),
            shutdown,
        }
    }

    /// Save every loaded world
    pub async fn save_all(&self) -> Result<CommandReport, ControlError> {
        self.run_batch(Command::Save, |registry| {
            let mut saved = Vec::new();
            for world in registry.list_worlds() {
                registry
                    .save(&world)
                    .map_err(|e| ControlError::world(Command::Save, &world.name, e))?;
                saved.push(world.name);
            }
            Ok(saved)
        })
        .await
    }

    /// Recreate and register every world the host knows about
    pub async fn load_all(&self) -> Result<CommandReport, ControlError> {
        self.run_batch(Command::Load, |registry| {
            let names = registry.known_worlds().map_err(|source| ControlError::Host {
                command: Command::Load,
                source,
            })?;

            let mut loaded = Vec::with_capacity(names.len());
            for name in names {
                let world = registry
                    .recreate(&name)
                    .map_err(|e| ControlError::world(Command::Load, &name, e))?;
                loaded.push(world.name);
            }
            Ok(loaded)
        })
        .await
    }

    /// Unload every loaded world, forcing a save first
    pub async fn unload_all(&self) -> Result<CommandReport, ControlError> {
        self.run_batch(Command::Unload, |registry| {
            let mut unloaded = Vec::new();
            for world in registry.list_worlds() {
                registry
                    .unload(&world, true)
                    .map_err(|e| ControlError::world(Command::Unload, &world.name, e))?;
                unloaded.push(world.name);
            }
            Ok(unloaded)
        })
        .await
    }

    /// Names of the currently loaded worlds
    pub async fn loaded_worlds(&self) -> Result<Vec<String>, ControlError> {
        let worlds = self.executor.submit(|registry| registry.list_worlds()).await?;
        Ok(worlds.into_iter().map(|w| w.name).collect())
    }

    /// Ask the service to shut down.
    ///
    /// Only flips the shutdown flag; the host itself is shut down by
    /// [`WorldControl::finish_shutdown`] once the listener has drained.
    /// Returns `true` for the first request.
    pub fn request_shutdown(&self) -> bool {
        let already = self.shutdown.send_replace(true);
        if !already {
            info!("Shutdown requested");
        }
        !already
    }

    /// Whether shutdown has been requested
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Resolves once shutdown has been requested
    pub async fn shutdown_requested(&self) {
        let mut rx = self.shutdown.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|requested| *requested).await;
    }

    /// Wait for in-flight batches, then shut the host down
    pub async fn finish_shutdown(&self) -> Result<(), ControlError> {
        self.request_shutdown();
        let _guard = self.mutation_gate.lock().await;

        match self.executor.stop().await {
            Ok(result) => result.map_err(|source| ControlError::Host {
                command: Command::Shutdown,
                source,
            })?,
            // Already stopped by an earlier call.
            Err(ExecutorError::Stopped) | Err(ExecutorError::Aborted) => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        info!("Host shutdown complete");
        Ok(())
    }

    async fn run_batch<F>(&self, command: Command, work: F) -> Result<CommandReport, ControlError>
    where
        F: FnOnce(&mut dyn WorldRegistry) -> Batch + Send + 'static,
    {
        if self.is_shutting_down() {
            return Err(ControlError::ShuttingDown);
        }

        let _guard = self.mutation_gate.lock().await;
        // Shutdown may have been requested while waiting for the gate.
        if self.is_shutting_down() {
            return Err(ControlError::ShuttingDown);
        }

        let worlds = self.executor.submit(work).await??;
        info!("{} completed for {} world(s): {:?}", command, worlds.len(), worlds);

        Ok(CommandReport { command, worlds })
    }
}
