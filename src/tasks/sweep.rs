//! Sweep Job
//!
//! Completes every incomplete todo in the store, whether or not it was ever
//! queued. Runs are non-reentrant: a trigger arriving while a run is in
//! progress is skipped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::{complete_guarded, wait_for_shutdown};
use crate::config::MAX_INTERVAL_SECS;
use crate::error::Result;
use crate::service::TodoServiceFactory;

/// Per-item results of one sweep run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Ids completed in this run
    pub completed: Vec<i64>,
    /// Ids whose completion failed, with the error message
    pub failed: Vec<(i64, String)>,
}

impl SweepReport {
    pub fn attempted(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Another run held the job; nothing was done
    Skipped,
    Ran(SweepReport),
}

pub struct SweepJob {
    factory: Arc<dyn TodoServiceFactory>,
    running: Mutex<()>,
}

impl SweepJob {
    pub fn new(factory: Arc<dyn TodoServiceFactory>) -> Self {
        Self {
            factory,
            running: Mutex::new(()),
        }
    }

    // == Run ==
    /// Completes every incomplete todo, one at a time, in store order.
    ///
    /// A failing item is recorded in the report and the run moves on.
    /// Errors are returned only when the scope cannot be opened or the
    /// incomplete set cannot be loaded.
    pub async fn run(&self) -> Result<SweepOutcome> {
        let Ok(_running) = self.running.try_lock() else {
            warn!("Sweep job is still running, skipping this trigger");
            return Ok(SweepOutcome::Skipped);
        };

        let service = self.factory.create_scope()?;

        info!("Getting all not completed todos");
        let todos = service.get_all_not_completed().await?;

        let mut report = SweepReport::default();
        if todos.is_empty() {
            info!("There is no todo to be completed");
            return Ok(SweepOutcome::Ran(report));
        }

        for todo in todos {
            info!(todo_id = todo.id, name = %todo.name, "Completing todo");

            match complete_guarded(service.as_ref(), &todo).await {
                Ok(_) => report.completed.push(todo.id),
                Err(err) => {
                    error!(todo_id = todo.id, error = %err, "Sweep failed to complete todo");
                    report.failed.push((todo.id, err.to_string()));
                }
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "Sweep run finished"
        );
        Ok(SweepOutcome::Ran(report))
    }
}

/// Spawns the periodic trigger for `job`.
///
/// The first run fires one full interval after start. Each run is spawned
/// on its own task, so a slow run does not delay the trigger and an
/// overlapping tick is turned away by the job itself. On shutdown the
/// trigger stops firing and waits for any run still in progress.
pub fn spawn_sweep_task(
    job: Arc<SweepJob>,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let secs = interval_secs.clamp(1, MAX_INTERVAL_SECS);
    if secs != interval_secs {
        warn!(requested = interval_secs, used = secs, "Sweep interval out of range, clamping");
    }
    let period = Duration::from_secs(secs);

    tokio::spawn(async move {
        info!("Starting sweep trigger with interval of {} seconds", secs);

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut runs = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                Some(joined) = runs.join_next(), if !runs.is_empty() => {
                    log_join_error(joined);
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let job = job.clone();
            runs.spawn(async move {
                if let Err(err) = job.run().await {
                    error!(error = %err, "Sweep run aborted");
                }
            });
        }

        if !runs.is_empty() {
            info!(in_flight = runs.len(), "Waiting for sweep run to finish");
        }
        while let Some(joined) = runs.join_next().await {
            log_join_error(joined);
        }

        info!("Sweep trigger stopped");
    })
}

fn log_join_error(joined: std::result::Result<(), JoinError>) {
    if let Err(err) = joined {
        error!(error = %err, "Sweep run ended abnormally");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Todo;
    use crate::service::{StoreServiceFactory, TodoService};
    use crate::store::{InMemoryTodoStore, TodoStore};
    use crate::tasks::shutdown_channel;
    use crate::tasks::test_support::ScriptedFactory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn seeded_store(todos: Vec<Todo>) -> Arc<dyn TodoStore> {
        Arc::new(InMemoryTodoStore::with_items(todos))
    }

    #[tokio::test]
    async fn test_no_incomplete_items_is_noop() {
        let mut done = Todo::new(1, "done");
        done.complete(chrono::Utc::now());
        let factory = ScriptedFactory::new(seeded_store(vec![done]));
        let probe = factory.probe.clone();
        let job = SweepJob::new(Arc::new(factory));

        let outcome = job.run().await.unwrap();

        assert_eq!(outcome, SweepOutcome::Ran(SweepReport::default()));
        assert_eq!(probe.completions(), 0);
    }

    #[tokio::test]
    async fn test_completes_all_incomplete() {
        let store = seeded_store(vec![Todo::new(1, "a"), Todo::new(2, "b")]);
        let job = SweepJob::new(Arc::new(StoreServiceFactory::new(store.clone())));

        let outcome = job.run().await.unwrap();

        match outcome {
            SweepOutcome::Ran(report) => assert_eq!(report.completed, vec![1, 2]),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(store.get_all_incomplete().await.unwrap().is_empty());

        // Second run finds nothing left
        let again = job.run().await.unwrap();
        assert_eq!(again, SweepOutcome::Ran(SweepReport::default()));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_run() {
        let store = seeded_store(vec![Todo::new(1, "a"), Todo::new(2, "b"), Todo::new(3, "c")]);
        let factory = ScriptedFactory::new(store.clone())
            .failing_on([2])
            .panicking_on([3]);
        let probe = factory.probe.clone();
        let job = SweepJob::new(Arc::new(factory));

        let report = match job.run().await.unwrap() {
            SweepOutcome::Ran(report) => report,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert_eq!(report.completed, vec![1]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.attempted(), 3);
        assert_eq!(probe.completions(), 3);

        let remaining: Vec<i64> = store
            .get_all_incomplete()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(remaining, vec![2, 3]);
    }

    /// Service whose listing blocks until released.
    struct GatedService {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl TodoService for GatedService {
        async fn complete_todo(&self, todo: &Todo) -> Result<Todo> {
            Ok(todo.clone())
        }

        async fn get_all_not_completed(&self) -> Result<Vec<Todo>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (e, r) = (entered.clone(), release.clone());
        let factory = move || -> Result<Box<dyn TodoService>> {
            Ok(Box::new(GatedService {
                entered: e.clone(),
                release: r.clone(),
            }))
        };
        let job = Arc::new(SweepJob::new(Arc::new(factory)));

        let first = tokio::spawn({
            let job = job.clone();
            async move { job.run().await }
        });
        entered.notified().await;

        // First run is parked inside the store call
        assert_eq!(job.run().await.unwrap(), SweepOutcome::Skipped);

        release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, SweepOutcome::Ran(SweepReport::default()));

        // Once finished the job accepts new triggers
        let entered_again = entered.clone();
        let next = tokio::spawn({
            let job = job.clone();
            async move { job.run().await }
        });
        entered_again.notified().await;
        release.notify_one();
        assert!(matches!(next.await.unwrap().unwrap(), SweepOutcome::Ran(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_runs_periodically_and_stops() {
        let store = seeded_store(vec![Todo::new(1, "a")]);
        let job = Arc::new(SweepJob::new(Arc::new(StoreServiceFactory::new(store.clone()))));
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let handle = spawn_sweep_task(job, 30, shutdown_rx);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!store.get(1).await.unwrap().is_complete, "No run before the first interval");

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert!(store.get(1).await.unwrap().is_complete);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    /// Service whose listing blocks until released, then completes one todo.
    struct SlowRunService {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        completions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TodoService for SlowRunService {
        async fn complete_todo(&self, todo: &Todo) -> Result<Todo> {
            self.completions.fetch_add(1, Ordering::SeqCst);
            Ok(todo.clone())
        }

        async fn get_all_not_completed(&self) -> Result<Vec<Todo>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![Todo::new(1, "a")])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_in_flight_run() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let completions = Arc::new(AtomicUsize::new(0));
        let (e, r, c) = (entered.clone(), release.clone(), completions.clone());
        let factory = move || -> Result<Box<dyn TodoService>> {
            Ok(Box::new(SlowRunService {
                entered: e.clone(),
                release: r.clone(),
                completions: c.clone(),
            }))
        };
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let job = Arc::new(SweepJob::new(Arc::new(factory)));
        let mut handle = spawn_sweep_task(job, 1, shutdown_rx);
        entered.notified().await;

        shutdown_tx.send(true).unwrap();
        let pending = tokio::time::timeout(Duration::from_secs(5), &mut handle).await;
        assert!(pending.is_err(), "Trigger must not stop while a run is in progress");
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        release.notify_one();
        handle.await.unwrap();
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_interval_is_clamped() {
        let store = seeded_store(vec![Todo::new(1, "a")]);
        let job = Arc::new(SweepJob::new(Arc::new(StoreServiceFactory::new(store.clone()))));
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let handle = spawn_sweep_task(job, u64::MAX, shutdown_rx);
        tokio::time::sleep(Duration::from_secs(MAX_INTERVAL_SECS + 1)).await;
        assert!(store.get(1).await.unwrap().is_complete);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
