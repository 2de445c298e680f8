//! Response DTOs for the todo API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for POST /todoitems/:id/complete
#[derive(Debug, Clone, Serialize)]
pub struct EnqueuedResponse {
    /// Human readable status
    pub message: String,
    /// The queued todo id
    pub id: i64,
    /// Queue length right after enqueueing
    pub queue_length: usize,
}

impl EnqueuedResponse {
    pub fn new(id: i64, queue_length: usize) -> Self {
        Self {
            message: format!("Todo '{}' queued for completion", id),
            id,
            queue_length,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Pending completion requests
    pub queue_length: usize,
    /// Current background worker state
    pub worker_state: String,
    /// Process-local tier statistics
    pub local_cache: TierStats,
    /// Shared tier statistics
    pub shared_cache: TierStats,
}

/// Per-tier counters plus derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct TierStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for TierStats {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
