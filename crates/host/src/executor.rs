//! Host Execution Context
//!
//! All world operations run on one dedicated thread that owns the
//! [`WorldRegistry`]. Callers submit a unit of work and await its result over
//! a oneshot channel, so a reply is only produced once the work is done.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::registry::WorldRegistry;
use crate::Result as HostResult;

/// Name of the thread owning the registry
pub const HOST_THREAD_NAME: &str = "host-main";

/// Failures of the execution context itself, as opposed to host operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Host execution context has stopped")]
    Stopped,

    #[error("Host work was aborted before completing")]
    Aborted,

    #[error("Failed to start host thread: {reason}")]
    Spawn { reason: String },
}

type Job = Box<dyn FnOnce(&mut dyn WorldRegistry) + Send>;

enum Message {
    Run(Job),
    Stop(oneshot::Sender<HostResult<()>>),
}

/// Handle to the single-threaded host execution context
#[derive(Debug, Clone)]
pub struct HostExecutor {
    jobs: mpsc::UnboundedSender<Message>,
}

impl HostExecutor {
    /// Move `registry` onto a new host thread and return a handle to it
    pub fn spawn<R>(registry: R) -> Result<Self, ExecutorError>
    where
        R: WorldRegistry + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name(HOST_THREAD_NAME.to_string())
            .spawn(move || run_host_loop(Box::new(registry), rx))
            .map_err(|e| ExecutorError::Spawn { reason: e.to_string() })?;

        Ok(Self { jobs: tx })
    }

    /// Run `work` on the host thread and wait for its result.
    ///
    /// A panic inside `work` is contained on the host thread and reported as
    /// [`ExecutorError::Aborted`].
    pub async fn submit<T, F>(&self, work: F) -> Result<T, ExecutorError>
    where
        F: FnOnce(&mut dyn WorldRegistry) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |registry: &mut dyn WorldRegistry| {
            let _ = reply_tx.send(work(registry));
        });

        self.jobs
            .send(Message::Run(job))
            .map_err(|_| ExecutorError::Stopped)?;

        reply_rx.await.map_err(|_| ExecutorError::Aborted)
    }

    /// Shut the host down as the final unit of work and end the thread.
    ///
    /// Work submitted after this call fails with [`ExecutorError::Stopped`].
    pub async fn stop(&self) -> Result<HostResult<()>, ExecutorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.jobs
            .send(Message::Stop(reply_tx))
            .map_err(|_| ExecutorError::Stopped)?;

        reply_rx.await.map_err(|_| ExecutorError::Aborted)
    }
}

fn run_host_loop(mut registry: Box<dyn WorldRegistry>, mut rx: mpsc::UnboundedReceiver<Message>) {
    debug!("Host execution context started");

    while let Some(message) = rx.blocking_recv() {
        match message {
            Message::Run(job) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(registry.as_mut())));
                if outcome.is_err() {
                    error!("Host work panicked; execution context continues");
                }
            }
            Message::Stop(reply) => {
                let result = match panic::catch_unwind(AssertUnwindSafe(|| registry.shutdown())) {
                    Ok(result) => result,
                    Err(_) => Err(crate::HostError::Other {
                        reason: "host shutdown panicked".to_string(),
                    }),
                };
                rx.close();
                let _ = reply.send(result);
                break;
            }
        }
    }

    info!("Host execution context stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;
    use crate::HostError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingRegistry {
        worlds: Vec<World>,
        shut_down: Arc<AtomicBool>,
    }

    impl WorldRegistry for RecordingRegistry {
        fn list_worlds(&self) -> Vec<World> {
            self.worlds.clone()
        }

        fn known_worlds(&self) -> HostResult<Vec<String>> {
            Ok(self.worlds.iter().map(|w| w.name.clone()).collect())
        }

        fn save(&mut self, _world: &World) -> HostResult<()> {
            Ok(())
        }

        fn recreate(&mut self, name: &str) -> HostResult<World> {
            let world = World::new(name, self.worlds.len() as u64 + 1);
            self.worlds.push(world.clone());
            Ok(world)
        }

        fn unload(&mut self, world: &World, _force_save: bool) -> HostResult<()> {
            self.worlds.retain(|w| w != world);
            Ok(())
        }

        fn shutdown(&mut self) -> HostResult<()> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_work_runs_on_host_thread() {
        let executor = HostExecutor::spawn(RecordingRegistry::default()).unwrap();

        let thread_name = executor
            .submit(|_| thread::current().name().map(str::to_string))
            .await
            .unwrap();
        assert_eq!(thread_name.as_deref(), Some(HOST_THREAD_NAME));
    }

    #[tokio::test]
    async fn test_submit_returns_result() {
        let executor = HostExecutor::spawn(RecordingRegistry::default()).unwrap();

        let world = executor
            .submit(|registry| registry.recreate("world"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(world.name, "world");

        let count = executor.submit(|registry| registry.list_worlds().len()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let executor = HostExecutor::spawn(RecordingRegistry::default()).unwrap();

        let result = executor
            .submit(|_| -> usize { panic!("world save exploded") })
            .await;
        assert_eq!(result, Err(ExecutorError::Aborted));

        let still_running = executor.submit(|registry| registry.list_worlds().len()).await;
        assert_eq!(still_running, Ok(0));
    }

    #[tokio::test]
    async fn test_stop_runs_shutdown_then_refuses_work() {
        let registry = RecordingRegistry::default();
        let shut_down = registry.shut_down.clone();
        let executor = HostExecutor::spawn(registry).unwrap();

        let result = executor.stop().await.unwrap();
        assert!(result.is_ok());
        assert!(shut_down.load(Ordering::SeqCst));

        let after = executor.submit(|registry| registry.list_worlds()).await;
        assert!(matches!(
            after,
            Err(ExecutorError::Stopped) | Err(ExecutorError::Aborted)
        ));
        assert!(matches!(
            executor.stop().await,
            Err(ExecutorError::Stopped) | Err(ExecutorError::Aborted)
        ));
    }

    #[tokio::test]
    async fn test_host_errors_pass_through() {
        let executor = HostExecutor::spawn(RecordingRegistry::default()).unwrap();

        let result = executor
            .submit(|_| -> HostResult<()> { Err(HostError::ShutDown) })
            .await
            .unwrap();
        assert!(matches!(result, Err(HostError::ShutDown)));
    }
}
