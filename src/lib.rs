//! Todo Pipeline - asynchronous completion of todo items
//!
//! A work queue drained by a polling background worker, a periodic sweep
//! job, and a cache-aside read path with local and shared tiers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod queue;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use queue::BackgroundQueue;
pub use tasks::{shutdown_channel, spawn_cleanup_task, spawn_sweep_task, QueueWorker, SweepJob};
