//! Error types for the todo pipeline
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Todo Error Enum ==
/// Unified error type for the todo pipeline.
#[derive(Error, Debug)]
pub enum TodoError {
    /// A precondition on an argument was violated (e.g. enqueueing a blank item)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Todo item does not exist in the store
    #[error("Todo not found: {0}")]
    NotFound(i64),

    /// Request data failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Backing store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Cache tier failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = match &self {
            TodoError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TodoError::Store(_) | TodoError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            TodoError::Serialization(_) | TodoError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the todo pipeline.
pub type Result<T> = std::result::Result<T, TodoError>;
