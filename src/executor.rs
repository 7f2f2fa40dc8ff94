//! Task executors for log mutations.
//!
//! The store hands every storage mutation to an [`Executor`] instead of
//! awaiting the engine directly. Swapping the executor changes the
//! scheduling of writes without touching the log logic: the
//! [`InlineExecutor`] completes each task before returning, while the
//! [`WorkerExecutor`] hands tasks to a dedicated worker and returns
//! immediately. Both preserve submission order for tasks submitted from
//! a single caller, which the store relies on to keep per-log mutations
//! ordered.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// A unit of work submitted to an executor.
///
/// Tasks report their outcome through channels captured inside the
/// future, so the executor itself does not observe success or failure.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Schedules log mutation tasks.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Submits a task for execution.
    ///
    /// When this returns, the task is either complete or queued behind
    /// every previously submitted task.
    async fn execute(&self, task: Task);
}

/// Executor that runs each task to completion before returning.
///
/// Useful for tests and for callers that want storage backpressure to
/// propagate directly into the submitting task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

#[async_trait]
impl Executor for InlineExecutor {
    async fn execute(&self, task: Task) {
        task.await;
    }
}

/// Executor backed by a single dedicated worker task.
///
/// Tasks are queued on an unbounded channel and run one at a time in
/// submission order. If the worker has shut down, submitted tasks run
/// inline so no mutation is silently dropped.
pub struct WorkerExecutor {
    sender: mpsc::UnboundedSender<Task>,
}

impl WorkerExecutor {
    /// Spawns the worker and returns the executor handle.
    ///
    /// The worker runs until every handle is dropped and the queue has
    /// drained.
    pub fn spawn() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        tokio::spawn(async move {
            while let Some(task) = receiver.recv().await {
                task.await;
            }
            debug!("worker executor stopped");
        });
        Self { sender }
    }
}

#[async_trait]
impl Executor for WorkerExecutor {
    async fn execute(&self, task: Task) {
        if let Err(err) = self.sender.send(task) {
            // Worker is gone; run the rejected task inline.
            err.0.await;
        }
    }
}
