//! In-memory todo store backed by a BTreeMap.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::TodoStore;
use crate::error::{Result, TodoError};
use crate::models::{NewTodo, Todo};

#[derive(Debug, Default)]
struct Inner {
    items: BTreeMap<i64, Todo>,
    next_id: i64,
}

// == In-Memory Todo Store ==
/// Process-local store. Concurrent writers race on a last-write-wins basis.
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    inner: RwLock<Inner>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with `todos`, keeping their ids.
    pub fn with_items(todos: impl IntoIterator<Item = Todo>) -> Self {
        let items: BTreeMap<i64, Todo> = todos.into_iter().map(|t| (t.id, t)).collect();
        let next_id = items.keys().next_back().copied().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner { items, next_id }),
        }
    }

    async fn filtered(&self, complete: bool) -> Vec<Todo> {
        let inner = self.inner.read().await;
        inner
            .items
            .values()
            .filter(|t| t.is_complete == complete)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn get_all(&self) -> Result<Vec<Todo>> {
        let inner = self.inner.read().await;
        Ok(inner.items.values().cloned().collect())
    }

    async fn get_all_incomplete(&self) -> Result<Vec<Todo>> {
        Ok(self.filtered(false).await)
    }

    async fn get_all_complete(&self) -> Result<Vec<Todo>> {
        Ok(self.filtered(true).await)
    }

    async fn get(&self, id: i64) -> Result<Todo> {
        let inner = self.inner.read().await;
        inner.items.get(&id).cloned().ok_or(TodoError::NotFound(id))
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let todo = todo.into_todo(id, Utc::now());
        inner.items.insert(id, todo.clone());
        debug!(todo_id = id, "Todo inserted");
        Ok(todo)
    }

    async fn update(
        &self,
        id: i64,
        name: String,
        is_complete: bool,
        now: DateTime<Utc>,
    ) -> Result<Todo> {
        let mut inner = self.inner.write().await;
        let todo = inner.items.get_mut(&id).ok_or(TodoError::NotFound(id))?;

        todo.name = name;
        if is_complete {
            if !todo.is_complete {
                todo.complete(now);
            }
        } else {
            todo.is_complete = false;
            todo.completed_at = None;
        }
        Ok(todo.clone())
    }

    async fn mark_complete(&self, id: i64, at: DateTime<Utc>) -> Result<Todo> {
        let mut inner = self.inner.write().await;
        let todo = inner.items.get_mut(&id).ok_or(TodoError::NotFound(id))?;
        todo.complete(at);
        Ok(todo.clone())
    }

    async fn delete(&self, id: i64) -> Result<Todo> {
        let mut inner = self.inner.write().await;
        inner.items.remove(&id).ok_or(TodoError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryTodoStore::new();

        let a = store.insert(NewTodo::new("a")).await.unwrap();
        let b = store.insert(NewTodo::new("b")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_with_items_continues_ids() {
        let store = InMemoryTodoStore::with_items(vec![Todo::new(7, "seed")]);
        let next = store.insert(NewTodo::new("next")).await.unwrap();
        assert_eq!(next.id, 8);
    }

    #[tokio::test]
    async fn test_incomplete_and_complete_partition() {
        let store = InMemoryTodoStore::new();
        store.insert(NewTodo::new("open")).await.unwrap();
        let done = store.insert(NewTodo::new("done")).await.unwrap();
        store.mark_complete(done.id, Utc::now()).await.unwrap();

        let incomplete = store.get_all_incomplete().await.unwrap();
        let complete = store.get_all_complete().await.unwrap();

        assert_eq!(incomplete.len(), 1);
        assert_eq!(incomplete[0].name, "open");
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].id, done.id);
    }

    #[tokio::test]
    async fn test_mark_complete_is_monotonic() {
        let store = InMemoryTodoStore::with_items(vec![Todo::new(1, "x")]);
        let later = Utc::now();

        store.mark_complete(1, later).await.unwrap();
        let todo = store
            .mark_complete(1, later - Duration::seconds(10))
            .await
            .unwrap();

        assert_eq!(todo.completed_at, Some(later));
    }

    #[tokio::test]
    async fn test_mark_complete_unknown_id() {
        let store = InMemoryTodoStore::new();
        let result = store.mark_complete(99, Utc::now()).await;
        assert!(matches!(result, Err(TodoError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_update_keeps_timestamp_invariant() {
        let store = InMemoryTodoStore::with_items(vec![Todo::new(1, "x")]);
        let now = Utc::now();

        let todo = assert_ok!(store.update(1, "y".into(), true, now).await);
        assert_eq!(todo.name, "y");
        assert_eq!(todo.completed_at, Some(now));

        let todo = assert_ok!(store.update(1, "y".into(), false, now).await);
        assert!(!todo.is_complete);
        assert!(todo.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryTodoStore::with_items(vec![Todo::new(1, "x")]);

        assert_ok!(store.delete(1).await);
        assert_err!(store.get(1).await);
        assert_err!(store.delete(1).await);
    }
}
