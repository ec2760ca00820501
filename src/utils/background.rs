//! Tracked background work.
//!
//! Anything spawned here is awaited during graceful shutdown, so a welcome
//! email queued just before SIGTERM is still delivered.

use std::future::Future;

use tokio_util::task::TaskTracker;
use tracing::error;

#[derive(Clone, Debug, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` to completion in the background.
    ///
    /// Errors and panics are logged under `name`; neither reaches the request
    /// that spawned the task.
    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.tracker.spawn(async move {
            match tokio::spawn(task).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => error!(task = name, error = ?err, "background task failed"),
                Err(join) if join.is_panic() => {
                    error!(task = name, "background task panicked")
                }
                Err(_) => {}
            }
        });
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Stops accepting new work and waits for everything already spawned.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
