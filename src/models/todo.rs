//! Todo domain model
//!
//! The item type moved through the work queue, the sweep job and the
//! cache-aside read path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::QueueItem;

/// A single todo item as owned by the store.
///
/// `completed_at` is set if and only if `is_complete` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub is_complete: bool,
    #[serde(rename = "completedTimestamp", default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Creates an incomplete todo.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_complete: false,
            completed_at: None,
        }
    }

    // == Complete ==
    /// Marks the item complete at `at`.
    ///
    /// The timestamp never moves backwards: re-completing keeps the later of
    /// the existing and the new instant.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.is_complete = true;
        self.completed_at = Some(match self.completed_at {
            Some(existing) if existing > at => existing,
            _ => at,
        });
    }
}

impl QueueItem for Todo {
    /// A todo without a name is the "null" request and is never queued.
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// Data for a todo that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub name: String,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_complete: false,
            completed_at: None,
        }
    }

    /// Attaches an id, restoring the completion invariant on the way.
    ///
    /// A complete item without timestamp is stamped with `now`; an
    /// incomplete one drops any timestamp it carried.
    pub fn into_todo(self, id: i64, now: DateTime<Utc>) -> Todo {
        let completed_at = if self.is_complete {
            Some(self.completed_at.unwrap_or(now))
        } else {
            None
        };

        Todo {
            id,
            name: self.name,
            is_complete: self.is_complete,
            completed_at,
        }
    }
}
