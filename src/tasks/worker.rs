//! Queue Worker
//!
//! Polls the work queue on a fixed interval and completes each dequeued todo
//! through a freshly opened service scope.
//!
//! Delivery is at-most-once: a todo whose completion fails is logged and
//! dropped, never retried or requeued. Items still queued at shutdown are
//! abandoned.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{complete_guarded, wait_for_shutdown};
use crate::error::Result;
use crate::models::Todo;
use crate::queue::BackgroundQueue;
use crate::service::TodoServiceFactory;

/// Lifecycle of the worker. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Initializing,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Initializing => "initializing",
            WorkerState::Running => "running",
            WorkerState::Stopping => "stopping",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Result of a single poll.
#[derive(Debug)]
pub enum Iteration {
    /// Queue was empty
    Idle,
    /// The todo was completed and persisted
    Completed(Todo),
    /// Completion failed; the todo was dropped
    Failed { todo_id: i64, error: String },
}

pub struct QueueWorker {
    queue: Arc<BackgroundQueue<Todo>>,
    factory: Arc<dyn TodoServiceFactory>,
    poll_interval: Duration,
}

impl QueueWorker {
    pub fn new(
        queue: Arc<BackgroundQueue<Todo>>,
        factory: Arc<dyn TodoServiceFactory>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            factory,
            poll_interval,
        }
    }

    // == Process Next ==
    /// Dequeues one todo, if any, and completes it.
    ///
    /// Never returns an error: failures are logged at error level and
    /// reported as [`Iteration::Failed`].
    pub async fn process_next(&self) -> Iteration {
        let Some(todo) = self.queue.dequeue() else {
            return Iteration::Idle;
        };

        info!(todo_id = todo.id, "Todo item found, completing it");

        match self.complete(&todo).await {
            Ok(completed) => {
                info!(todo_id = completed.id, "Todo item is completed");
                Iteration::Completed(completed)
            }
            Err(err) => {
                error!(
                    todo_id = todo.id,
                    error = %err,
                    "An error occurred when completing a todo, dropping it"
                );
                Iteration::Failed {
                    todo_id: todo.id,
                    error: err.to_string(),
                }
            }
        }
    }

    async fn complete(&self, todo: &Todo) -> Result<Todo> {
        // The scope lives for this call only and is dropped on every path
        let scope = self.factory.create_scope()?;
        complete_guarded(scope.as_ref(), todo).await
    }

    // == Spawn ==
    /// Starts the polling loop on the runtime.
    ///
    /// The loop sleeps for the poll interval, exits if `shutdown` fired,
    /// otherwise processes at most one todo. An in-flight completion is
    /// never interrupted.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> WorkerHandle {
        let (state_tx, state_rx) = watch::channel(WorkerState::Initializing);
        let join = tokio::spawn(self.run(shutdown, state_tx));
        WorkerHandle {
            state: state_rx,
            join,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, state: watch::Sender<WorkerState>) {
        state.send_replace(WorkerState::Running);
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Queue worker is now running in the background"
        );

        loop {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            if let Iteration::Idle = self.process_next().await {
                debug!("Work queue empty");
            }
        }

        state.send_replace(WorkerState::Stopping);
        error!(
            remaining = self.queue.len(),
            "Queue worker is stopping, queued items will not be processed anymore"
        );
        state.send_replace(WorkerState::Stopped);
    }
}

/// Handle to a spawned [`QueueWorker`].
pub struct WorkerHandle {
    state: watch::Receiver<WorkerState>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.clone()
    }

    /// Waits for the loop to exit after shutdown was requested.
    pub async fn join(self) {
        if let Err(err) = self.join.await {
            error!(error = %err, "Queue worker task ended abnormally");
        }
    }
}
