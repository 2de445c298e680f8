//! Request DTOs for the todo API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::todo::NewTodo;

/// Request body for creating or replacing a todo (POST/PUT /todoitems)
///
/// # Fields
/// - `name`: Required, non-blank
/// - `isComplete`: Optional completion flag (default false)
/// - `completedTimestamp`: Optional, must not be in the future
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(rename = "completedTimestamp", default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TodoRequest {
    /// Validates the request data against `now`
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self, now: DateTime<Utc>) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("The field 'Name' is required.".to_string());
        }
        if let Some(at) = self.completed_at {
            if at > now {
                return Some("The field 'CompletedTimestamp' cannot be in the future.".to_string());
            }
        }
        None
    }

    pub fn into_new_todo(self) -> NewTodo {
        NewTodo {
            name: self.name,
            is_complete: self.is_complete,
            completed_at: self.completed_at,
        }
    }
}
