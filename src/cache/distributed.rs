//! Shared cache tier.
//!
//! The shared tier exchanges serialized bytes through [`DistributedCache`].
//! `InProcessDistributedCache` is the in-memory backend used when no
//! external cache server is configured.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheStats, CacheStore, ExpirationPolicy};
use crate::error::Result;

#[async_trait]
pub trait DistributedCache: Send + Sync + 'static {
    /// `Ok(None)` on miss; `Err` when the tier cannot be reached.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, policy: ExpirationPolicy) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InProcessDistributedCache {
    store: Arc<RwLock<CacheStore<Vec<u8>>>>,
}

impl InProcessDistributedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the backing store, for the periodic cleanup task.
    pub fn store(&self) -> Arc<RwLock<CacheStore<Vec<u8>>>> {
        self.store.clone()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

#[async_trait]
impl DistributedCache for InProcessDistributedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.write().await.get(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, policy: ExpirationPolicy) -> Result<()> {
        self.store.write().await.set(key.to_string(), value, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get_until_absolute_expiry() {
        let cache = InProcessDistributedCache::new();
        cache
            .set("k", b"payload".to_vec(), ExpirationPolicy::shared_default())
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"payload"[..]));

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(9)).await;
            assert!(cache.get("k").await.unwrap().is_some());
        }

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.stats().await.expirations, 1);
    }
}
