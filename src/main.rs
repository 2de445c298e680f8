//! Todo Pipeline - asynchronous completion of todo items
//!
//! Serves the todo API and runs the background completion pipeline.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_pipeline::{
    api::create_router,
    service::{StoreServiceFactory, TodoServiceFactory},
    store::{InMemoryTodoStore, TodoStore},
    AppState, BackgroundQueue, Config, QueueWorker, SweepJob, shutdown_channel,
    spawn_cleanup_task, spawn_sweep_task,
};

/// Main entry point for the todo pipeline.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create store, work queue and cache tiers
/// 4. Start the queue worker, sweep trigger and cache cleanup tasks
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM: drain HTTP, then stop every background task
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_pipeline=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Todo Pipeline");

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: port={}, poll_interval={}ms, sweep_interval={}s, cache_tier={:?}",
        config.server_port, config.worker_poll_interval_ms, config.sweep_interval, config.cache_tier
    );

    let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());
    let queue = Arc::new(BackgroundQueue::new());
    let factory: Arc<dyn TodoServiceFactory> = Arc::new(StoreServiceFactory::new(store.clone()));
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let worker = QueueWorker::new(queue.clone(), factory.clone(), config.worker_poll_interval())
        .spawn(shutdown_rx.clone());
    info!("Queue worker started");

    let sweep = spawn_sweep_task(
        Arc::new(SweepJob::new(factory)),
        config.sweep_interval,
        shutdown_rx.clone(),
    );

    let state = AppState::from_config(&config, store, queue)
        .context("failed to build application state")?
        .with_worker_state(worker.subscribe());

    let local_cleanup = spawn_cleanup_task(
        state.local_cache.clone(),
        "local",
        config.cache_cleanup_interval,
        shutdown_rx.clone(),
    );
    let shared_cleanup = spawn_cleanup_task(
        state.shared_cache.store(),
        "shared",
        config.cache_cleanup_interval,
        shutdown_rx,
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Stop background work once no more requests can enqueue
    let _ = shutdown_tx.send(true);
    worker.join().await;
    for task in [sweep, local_cleanup, shared_cleanup] {
        if let Err(err) = task.await {
            tracing::error!(error = %err, "Background task ended abnormally");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
