//! Todo Store Module
//!
//! The backing store is the source of truth for todo items. The pipeline
//! reaches it only through the [`TodoStore`] trait.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{NewTodo, Todo};

pub use memory::InMemoryTodoStore;

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Every item, ordered by id.
    async fn get_all(&self) -> Result<Vec<Todo>>;

    async fn get_all_incomplete(&self) -> Result<Vec<Todo>>;

    async fn get_all_complete(&self) -> Result<Vec<Todo>>;

    /// Fails with `NotFound` when the id is unknown.
    async fn get(&self, id: i64) -> Result<Todo>;

    /// Assigns the next id and persists the item.
    async fn insert(&self, todo: NewTodo) -> Result<Todo>;

    /// Replaces name and completion flag, keeping the timestamp invariant.
    async fn update(
        &self,
        id: i64,
        name: String,
        is_complete: bool,
        now: DateTime<Utc>,
    ) -> Result<Todo>;

    /// Sets the completion flag and timestamp; the timestamp never rewinds.
    async fn mark_complete(&self, id: i64, at: DateTime<Utc>) -> Result<Todo>;

    /// Removes and returns the item.
    async fn delete(&self, id: i64) -> Result<Todo>;
}
