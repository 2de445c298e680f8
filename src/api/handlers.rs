//! API Handlers
//!
//! HTTP request handlers for the todo endpoints. Handlers are producers for
//! the work queue and readers through the cache-aside layer; they never
//! touch the cache on writes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tracing::info;

use crate::cache::{
    CacheStore, InProcessDistributedCache, LocalTierReader, LocalTodoCache, SharedTierReader,
    TodoReader,
};
use crate::config::{CacheTier, Config};
use crate::error::{Result, TodoError};
use crate::models::{EnqueuedResponse, HealthResponse, StatsResponse, Todo, TodoRequest};
use crate::queue::BackgroundQueue;
use crate::store::TodoStore;
use crate::tasks::WorkerState;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of truth
    pub store: Arc<dyn TodoStore>,
    /// Pending completion requests
    pub queue: Arc<BackgroundQueue<Todo>>,
    /// Cache-aside reader for the configured tier
    pub reader: Arc<dyn TodoReader>,
    pub local_cache: LocalTodoCache,
    pub shared_cache: Arc<InProcessDistributedCache>,
    /// Observed worker lifecycle, if a worker was attached
    pub worker_state: Option<watch::Receiver<WorkerState>>,
}

impl AppState {
    /// Creates state around `store` and `queue` using the configured tier
    /// and windows. The caller owns the queue and hands it to the worker.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn TodoStore>,
        queue: Arc<BackgroundQueue<Todo>>,
    ) -> Result<Self> {
        let local_cache: LocalTodoCache = Arc::new(RwLock::new(CacheStore::new()));
        let shared_cache = Arc::new(InProcessDistributedCache::new());

        let reader: Arc<dyn TodoReader> = match config.cache_tier {
            CacheTier::Local => Arc::new(LocalTierReader::new(
                local_cache.clone(),
                store.clone(),
                config.local_policy()?,
            )),
            CacheTier::Shared => Arc::new(SharedTierReader::new(
                shared_cache.clone(),
                store.clone(),
                config.shared_policy()?,
            )),
        };

        Ok(Self {
            store,
            queue,
            reader,
            local_cache,
            shared_cache,
            worker_state: None,
        })
    }

    pub fn with_worker_state(mut self, state: watch::Receiver<WorkerState>) -> Self {
        self.worker_state = Some(state);
        self
    }
}

/// Handler for GET /todoitems
///
/// Served through the cache-aside layer; may be stale.
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<Todo>>> {
    Ok(Json(state.reader.get_all().await?))
}

/// Handler for GET /todoitems/complete
pub async fn list_complete_handler(State(state): State<AppState>) -> Result<Json<Vec<Todo>>> {
    Ok(Json(state.store.get_all_complete().await?))
}

/// Handler for GET /todoitems/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>> {
    Ok(Json(state.store.get(id).await?))
}

/// Handler for POST /todoitems
pub async fn create_handler(
    State(state): State<AppState>,
    Json(req): Json<TodoRequest>,
) -> Result<impl IntoResponse> {
    if let Some(error_msg) = req.validate(Utc::now()) {
        return Err(TodoError::Validation(error_msg));
    }

    let todo = state.store.insert(req.into_new_todo()).await?;
    info!(todo_id = todo.id, "Todo item was saved");

    let location = format!("/todoitems/{}", todo.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(todo)))
}

/// Handler for PUT /todoitems/:id
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TodoRequest>,
) -> Result<StatusCode> {
    let now = Utc::now();
    if let Some(error_msg) = req.validate(now) {
        return Err(TodoError::Validation(error_msg));
    }

    state.store.update(id, req.name, req.is_complete, now).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /todoitems/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>> {
    Ok(Json(state.store.delete(id).await?))
}

/// Handler for POST /todoitems/:id/complete
///
/// Queues the todo for the background worker and returns immediately.
pub async fn complete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<EnqueuedResponse>)> {
    let todo = state.store.get(id).await?;
    state.queue.enqueue(todo)?;

    let queue_length = state.queue.len();
    info!(todo_id = id, queue_length, "Todo queued for completion");
    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueuedResponse::new(id, queue_length)),
    ))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let local = state.local_cache.read().await.stats();
    let shared = state.shared_cache.stats().await;
    let worker_state = state
        .worker_state
        .as_ref()
        .map(|rx| rx.borrow().to_string())
        .unwrap_or_else(|| "detached".to_string());

    Json(StatsResponse {
        queue_length: state.queue.len(),
        worker_state,
        local_cache: local.into(),
        shared_cache: shared.into(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
