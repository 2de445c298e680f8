//! Cache Entry Module
//!
//! Defines individual cache entries with sliding and absolute expiration.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Result, TodoError};

/// Longest absolute window a policy may carry.
pub const MAX_EXPIRATION: Duration = Duration::from_secs(24 * 60 * 60);

// == Expiration Policy ==
/// Pair of expiration windows carried by every entry.
///
/// - `sliding`: reset on each successful access
/// - `absolute`: hard ceiling measured from creation
///
/// The sliding window never exceeds the absolute one, and the absolute one
/// never exceeds [`MAX_EXPIRATION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    sliding: Duration,
    absolute: Duration,
}

impl ExpirationPolicy {
    pub fn new(sliding: Duration, absolute: Duration) -> Result<Self> {
        if absolute.is_zero() {
            return Err(TodoError::InvalidArgument(
                "absolute expiration must be greater than zero".to_string(),
            ));
        }
        if absolute > MAX_EXPIRATION {
            return Err(TodoError::InvalidArgument(format!(
                "absolute expiration ({:?}) exceeds the maximum of {:?}",
                absolute, MAX_EXPIRATION
            )));
        }
        if sliding > absolute {
            return Err(TodoError::InvalidArgument(format!(
                "sliding expiration ({:?}) exceeds absolute expiration ({:?})",
                sliding, absolute
            )));
        }
        Ok(Self { sliding, absolute })
    }

    /// 10s sliding / 20s absolute.
    pub fn local_default() -> Self {
        Self {
            sliding: Duration::from_secs(10),
            absolute: Duration::from_secs(20),
        }
    }

    /// 10s sliding / 30s absolute.
    pub fn shared_default() -> Self {
        Self {
            sliding: Duration::from_secs(10),
            absolute: Duration::from_secs(30),
        }
    }

    pub fn sliding(&self) -> Duration {
        self.sliding
    }

    pub fn absolute(&self) -> Duration {
        self.absolute
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and expiration metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation instant, origin of the absolute window
    pub created_at: Instant,
    /// Last successful access, origin of the sliding window
    pub last_access: Instant,
    pub policy: ExpirationPolicy,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, policy: ExpirationPolicy) -> Self {
        Self::new_at(value, policy, Instant::now())
    }

    pub fn new_at(value: V, policy: ExpirationPolicy, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            last_access: now,
            policy,
        }
    }

    // == Expires At ==
    /// The earlier of the sliding and absolute deadlines.
    pub fn expires_at(&self) -> Instant {
        let sliding = self.last_access + self.policy.sliding;
        let absolute = self.created_at + self.policy.absolute;
        sliding.min(absolute)
    }

    // == Is Expired ==
    /// Boundary condition: an entry is expired once `now` reaches its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    // == Touch ==
    /// Restarts the sliding window. The absolute ceiling is unaffected.
    pub fn touch(&mut self, now: Instant) {
        self.last_access = now;
    }
}
