//! Completion Service
//!
//! The business operation shared by the background worker and the sweep
//! job, plus the factory the worker uses to open one short-lived service
//! scope per iteration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::Result;
use crate::models::Todo;
use crate::store::TodoStore;

#[async_trait]
pub trait TodoService: Send + Sync {
    /// Sets the completion flag and stamps the completion time, then persists.
    async fn complete_todo(&self, todo: &Todo) -> Result<Todo>;

    async fn get_all_not_completed(&self) -> Result<Vec<Todo>>;
}

/// Opens a fresh service scope.
///
/// The returned box is the scope: it is released when dropped, on every path.
pub trait TodoServiceFactory: Send + Sync {
    fn create_scope(&self) -> Result<Box<dyn TodoService>>;
}

impl<F> TodoServiceFactory for F
where
    F: Fn() -> Result<Box<dyn TodoService>> + Send + Sync,
{
    fn create_scope(&self) -> Result<Box<dyn TodoService>> {
        self()
    }
}

// == Store-backed Service ==
pub struct StoreTodoService {
    store: Arc<dyn TodoStore>,
}

impl StoreTodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TodoService for StoreTodoService {
    async fn complete_todo(&self, todo: &Todo) -> Result<Todo> {
        let completed = self.store.mark_complete(todo.id, Utc::now()).await?;
        debug!(
            todo_id = completed.id,
            completed_at = ?completed.completed_at,
            "Todo persisted as complete"
        );
        Ok(completed)
    }

    async fn get_all_not_completed(&self) -> Result<Vec<Todo>> {
        self.store.get_all_incomplete().await
    }
}

/// Factory handing out a new [`StoreTodoService`] per scope.
#[derive(Clone)]
pub struct StoreServiceFactory {
    store: Arc<dyn TodoStore>,
}

impl StoreServiceFactory {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

impl TodoServiceFactory for StoreServiceFactory {
    fn create_scope(&self) -> Result<Box<dyn TodoService>> {
        Ok(Box::new(StoreTodoService::new(self.store.clone())))
    }
}
