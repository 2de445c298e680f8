//! Work Queue Module
//!
//! In-memory FIFO of pending completion requests shared between producers
//! (HTTP handlers) and the background worker.
//!
//! The queue is unbounded and offers no backpressure. Nothing is persisted:
//! items still queued when the process stops are lost.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{Result, TodoError};

/// Items that can be placed on a [`BackgroundQueue`].
pub trait QueueItem {
    /// Returns true for the empty/null value the queue must reject.
    fn is_blank(&self) -> bool;
}

// == Background Queue ==
/// Thread-safe FIFO queue. Neither `enqueue` nor `dequeue` waits for work.
#[derive(Debug)]
pub struct BackgroundQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for BackgroundQueue<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T: QueueItem> BackgroundQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Enqueue ==
    /// Appends `item` to the tail.
    ///
    /// Fails with `InvalidArgument` for a blank item, leaving the queue untouched.
    pub fn enqueue(&self, item: T) -> Result<()> {
        if item.is_blank() {
            return Err(TodoError::InvalidArgument(
                "cannot enqueue an empty item".to_string(),
            ));
        }

        let mut items = self.lock("enqueue");
        items.push_back(item);
        debug!(queue_length = items.len(), "Item enqueued");
        Ok(())
    }

    // == Dequeue ==
    /// Removes and returns the head item, or `None` when the queue is empty.
    pub fn dequeue(&self) -> Option<T> {
        self.lock("dequeue").pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock("is_empty").is_empty()
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, VecDeque<T>> {
        // A panicking holder cannot leave the deque half-modified, so the
        // poisoned guard is still usable.
        self.items.lock().unwrap_or_else(|poisoned| {
            warn!(op, "Recovered from poisoned queue lock");
            poisoned.into_inner()
        })
    }
}
