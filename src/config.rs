//! Configuration Module
//!
//! Handles loading and managing pipeline configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::ExpirationPolicy;
use crate::error::{Result, TodoError};

/// Upper bound for the sweep and cleanup intervals.
pub const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Upper bound for the worker poll delay.
pub const MAX_POLL_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// Which cache tier serves `GET /todoitems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Process-local memory cache
    Local,
    /// Shared cache reached through serialized snapshots
    Shared,
}

impl FromStr for CacheTier {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(CacheTier::Local),
            "shared" => Ok(CacheTier::Shared),
            other => Err(TodoError::InvalidArgument(format!(
                "unknown cache tier '{}', expected 'local' or 'shared'",
                other
            ))),
        }
    }
}

/// Pipeline configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Delay between background worker polls, in milliseconds
    pub worker_poll_interval_ms: u64,
    /// Sweep job trigger interval in seconds
    pub sweep_interval: u64,
    /// Local cache cleanup interval in seconds
    pub cache_cleanup_interval: u64,
    /// Tier used for list reads
    pub cache_tier: CacheTier,
    /// Sliding/absolute windows for the local tier, in seconds
    pub local_sliding: u64,
    pub local_absolute: u64,
    /// Sliding/absolute windows for the shared tier, in seconds
    pub shared_sliding: u64,
    pub shared_absolute: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    parse_or(name, env::var(name).ok().as_deref(), default)
}

/// Parses `raw`, keeping `default` when it is absent or malformed.
fn parse_or<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("Ignoring invalid value '{}' for {}, using the default", raw, name);
            default
        }
    }
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `WORKER_POLL_INTERVAL_MS` - Worker poll delay (default: 1000)
    /// - `SWEEP_INTERVAL_SECS` - Sweep trigger interval (default: 30)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Local cache purge interval (default: 1)
    /// - `CACHE_TIER` - `local` or `shared` (default: local)
    /// - `LOCAL_CACHE_SLIDING_SECS` / `LOCAL_CACHE_ABSOLUTE_SECS` (default: 10 / 20)
    /// - `SHARED_CACHE_SLIDING_SECS` / `SHARED_CACHE_ABSOLUTE_SECS` (default: 10 / 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            worker_poll_interval_ms: env_or(
                "WORKER_POLL_INTERVAL_MS",
                defaults.worker_poll_interval_ms,
            ),
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            cache_cleanup_interval: env_or(
                "CACHE_CLEANUP_INTERVAL_SECS",
                defaults.cache_cleanup_interval,
            ),
            cache_tier: env_or("CACHE_TIER", defaults.cache_tier),
            local_sliding: env_or("LOCAL_CACHE_SLIDING_SECS", defaults.local_sliding),
            local_absolute: env_or("LOCAL_CACHE_ABSOLUTE_SECS", defaults.local_absolute),
            shared_sliding: env_or("SHARED_CACHE_SLIDING_SECS", defaults.shared_sliding),
            shared_absolute: env_or("SHARED_CACHE_ABSOLUTE_SECS", defaults.shared_absolute),
        }
    }

    /// Rejects zero or oversized intervals, and expiration windows whose
    /// sliding part exceeds the absolute ceiling.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_POLL_INTERVAL_MS).contains(&self.worker_poll_interval_ms) {
            return Err(TodoError::InvalidArgument(format!(
                "WORKER_POLL_INTERVAL_MS must be between 1 and {}",
                MAX_POLL_INTERVAL_MS
            )));
        }
        for (name, secs) in [
            ("SWEEP_INTERVAL_SECS", self.sweep_interval),
            ("CACHE_CLEANUP_INTERVAL_SECS", self.cache_cleanup_interval),
        ] {
            if !(1..=MAX_INTERVAL_SECS).contains(&secs) {
                return Err(TodoError::InvalidArgument(format!(
                    "{} must be between 1 and {}",
                    name, MAX_INTERVAL_SECS
                )));
            }
        }
        self.local_policy()?;
        self.shared_policy()?;
        Ok(())
    }

    pub fn worker_poll_interval(&self) -> Duration {
        Duration::from_millis(self.worker_poll_interval_ms)
    }

    pub fn local_policy(&self) -> Result<ExpirationPolicy> {
        ExpirationPolicy::new(
            Duration::from_secs(self.local_sliding),
            Duration::from_secs(self.local_absolute),
        )
    }

    pub fn shared_policy(&self) -> Result<ExpirationPolicy> {
        ExpirationPolicy::new(
            Duration::from_secs(self.shared_sliding),
            Duration::from_secs(self.shared_absolute),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            worker_poll_interval_ms: 1000,
            sweep_interval: 30,
            cache_cleanup_interval: 1,
            cache_tier: CacheTier::Local,
            local_sliding: 10,
            local_absolute: 20,
            shared_sliding: 10,
            shared_absolute: 30,
        }
    }
}
