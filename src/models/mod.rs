//! Domain model and request/response DTOs
//!
//! `Todo` is the item flowing through the pipeline; the request and
//! response types are the JSON bodies of the HTTP surface.

pub mod requests;
pub mod responses;
pub mod todo;

// Re-export commonly used types
pub use requests::TodoRequest;
pub use responses::{EnqueuedResponse, HealthResponse, StatsResponse, TierStats};
pub use todo::{NewTodo, Todo};
