//! Cache-aside reads of the full todo list.
//!
//! Two interchangeable tiers implement [`TodoReader`]:
//! - [`LocalTierReader`]: process-local entry holding the list itself
//! - [`SharedTierReader`]: serialized snapshot in a [`DistributedCache`]
//!
//! Both fill on miss and are never invalidated by writes, so a read can be
//! stale for up to the absolute window. Concurrent misses are not
//! coalesced: every caller that misses queries the store and writes back.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{CacheStore, DistributedCache, ExpirationPolicy};
use crate::error::Result;
use crate::models::Todo;
use crate::store::TodoStore;

/// Cache key for the full todo list.
pub const ALL_TODOS_KEY: &str = "todos:all";

/// Process-local cache holding decoded lists.
pub type LocalTodoCache = Arc<RwLock<CacheStore<Vec<Todo>>>>;

#[async_trait]
pub trait TodoReader: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Todo>>;
}

// == Local Tier ==
pub struct LocalTierReader {
    cache: LocalTodoCache,
    store: Arc<dyn TodoStore>,
    policy: ExpirationPolicy,
}

impl LocalTierReader {
    pub fn new(cache: LocalTodoCache, store: Arc<dyn TodoStore>, policy: ExpirationPolicy) -> Self {
        Self {
            cache,
            store,
            policy,
        }
    }
}

#[async_trait]
impl TodoReader for LocalTierReader {
    async fn get_all(&self) -> Result<Vec<Todo>> {
        // Write lock: a hit restarts the sliding window
        if let Some(todos) = self.cache.write().await.get(ALL_TODOS_KEY) {
            debug!(tier = "local", count = todos.len(), "Cache hit");
            return Ok(todos);
        }

        debug!(tier = "local", "Cache miss, querying store");
        let todos = self.store.get_all().await?;

        let mut cache = self.cache.write().await;
        if let Err(err) = cache.set(ALL_TODOS_KEY.to_string(), todos.clone(), self.policy) {
            warn!(tier = "local", error = %err, "Failed to populate cache");
        }

        Ok(todos)
    }
}

// == Shared Tier ==
pub struct SharedTierReader {
    cache: Arc<dyn DistributedCache>,
    store: Arc<dyn TodoStore>,
    policy: ExpirationPolicy,
}

impl SharedTierReader {
    pub fn new(
        cache: Arc<dyn DistributedCache>,
        store: Arc<dyn TodoStore>,
        policy: ExpirationPolicy,
    ) -> Self {
        Self {
            cache,
            store,
            policy,
        }
    }

    /// Cached snapshot, if one is present and decodable. Tier failures and
    /// corrupt payloads are logged and read as a miss.
    async fn cached(&self) -> Option<Vec<Todo>> {
        match self.cache.get(ALL_TODOS_KEY).await {
            Ok(Some(bytes)) => match decode_snapshot(&bytes) {
                Ok(todos) => Some(todos),
                Err(err) => {
                    warn!(tier = "shared", error = %err, "Discarding undecodable cached snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(
                    tier = "shared",
                    error = %err,
                    "Shared cache unavailable, falling back to store"
                );
                None
            }
        }
    }
}

fn encode_snapshot(todos: &[Todo]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(todos)?)
}

fn decode_snapshot(bytes: &[u8]) -> Result<Vec<Todo>> {
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
impl TodoReader for SharedTierReader {
    async fn get_all(&self) -> Result<Vec<Todo>> {
        if let Some(todos) = self.cached().await {
            debug!(tier = "shared", count = todos.len(), "Cache hit");
            return Ok(todos);
        }

        debug!(tier = "shared", "Cache miss, querying store");
        let todos = self.store.get_all().await?;

        match encode_snapshot(&todos) {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(ALL_TODOS_KEY, bytes, self.policy).await {
                    warn!(tier = "shared", error = %err, "Failed to populate shared cache");
                }
            }
            Err(err) => warn!(tier = "shared", error = %err, "Failed to serialize todo snapshot"),
        }

        Ok(todos)
    }
}
