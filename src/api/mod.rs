//! API Module
//!
//! HTTP handlers and routing for the todo service.
//!
//! # Endpoints
//! - `GET|POST /todoitems` - List (cached) or create todos
//! - `GET /todoitems/complete` - List completed todos
//! - `GET|PUT|DELETE /todoitems/:id` - Single todo operations
//! - `POST /todoitems/:id/complete` - Queue a todo for completion
//! - `GET /stats` - Pipeline statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
