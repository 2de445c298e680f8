//! Background Tasks Module
//!
//! Long-running tasks started with the process and stopped through a
//! shared shutdown channel.
//!
//! # Tasks
//! - Queue worker: drains the work queue and completes each todo
//! - Sweep job: periodically completes every incomplete todo
//! - Cache cleanup: purges expired cache entries
//!
//! The queue worker and the sweep job are two independent paths to the same
//! effect. A todo may be completed by either, or by both when a sweep
//! reaches it before the worker dequeues it; completion is idempotent apart
//! from the timestamp, which only moves forward.

mod cleanup;
mod sweep;
mod worker;

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::watch;

use crate::error::{Result, TodoError};
use crate::models::Todo;
use crate::service::TodoService;

pub use cleanup::spawn_cleanup_task;
pub use sweep::{spawn_sweep_task, SweepJob, SweepOutcome, SweepReport};
pub use worker::{Iteration, QueueWorker, WorkerHandle, WorkerState};

/// Creates the process-wide shutdown channel. Send `true` to stop every task.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Resolves once shutdown is requested or the sender is gone.
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A closed channel means nobody can ask us to keep running
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Runs one completion, turning a panic inside the service into an error.
pub(crate) async fn complete_guarded(service: &dyn TodoService, todo: &Todo) -> Result<Todo> {
    match AssertUnwindSafe(service.complete_todo(todo))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => Err(TodoError::Internal(format!(
            "completion panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Service doubles shared by the task tests.
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::error::{Result, TodoError};
    use crate::models::Todo;
    use crate::service::{StoreTodoService, TodoService, TodoServiceFactory};
    use crate::store::TodoStore;

    /// Counters observed by the tests.
    #[derive(Default)]
    pub struct Probe {
        pub scopes_created: AtomicUsize,
        pub scopes_released: AtomicUsize,
        pub completions: AtomicUsize,
    }

    impl Probe {
        pub fn created(&self) -> usize {
            self.scopes_created.load(Ordering::SeqCst)
        }
        pub fn released(&self) -> usize {
            self.scopes_released.load(Ordering::SeqCst)
        }
        pub fn completions(&self) -> usize {
            self.completions.load(Ordering::SeqCst)
        }
    }

    /// Store-backed service that fails or panics for selected ids.
    pub struct ScriptedService {
        inner: StoreTodoService,
        probe: Arc<Probe>,
        fail_ids: HashSet<i64>,
        panic_ids: HashSet<i64>,
    }

    #[async_trait]
    impl TodoService for ScriptedService {
        async fn complete_todo(&self, todo: &Todo) -> Result<Todo> {
            self.probe.completions.fetch_add(1, Ordering::SeqCst);
            if self.panic_ids.contains(&todo.id) {
                panic!("handler exploded on {}", todo.id);
            }
            if self.fail_ids.contains(&todo.id) {
                return Err(TodoError::Store(format!("store unavailable for {}", todo.id)));
            }
            self.inner.complete_todo(todo).await
        }

        async fn get_all_not_completed(&self) -> Result<Vec<Todo>> {
            self.inner.get_all_not_completed().await
        }
    }

    impl Drop for ScriptedService {
        fn drop(&mut self) {
            self.probe.scopes_released.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub struct ScriptedFactory {
        pub store: Arc<dyn TodoStore>,
        pub probe: Arc<Probe>,
        pub fail_ids: HashSet<i64>,
        pub panic_ids: HashSet<i64>,
    }

    impl ScriptedFactory {
        pub fn new(store: Arc<dyn TodoStore>) -> Self {
            Self {
                store,
                probe: Arc::new(Probe::default()),
                fail_ids: HashSet::new(),
                panic_ids: HashSet::new(),
            }
        }

        pub fn failing_on(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
            self.fail_ids.extend(ids);
            self
        }

        pub fn panicking_on(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
            self.panic_ids.extend(ids);
            self
        }
    }

    impl TodoServiceFactory for ScriptedFactory {
        fn create_scope(&self) -> Result<Box<dyn TodoService>> {
            self.probe.scopes_created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedService {
                inner: StoreTodoService::new(self.store.clone()),
                probe: self.probe.clone(),
                fail_ids: self.fail_ids.clone(),
                panic_ids: self.panic_ids.clone(),
            }))
        }
    }
}
