//! Cache Module
//!
//! Cache-aside read path for the todo list: expiring entries, an
//! in-process store, the shared tier abstraction, and the two readers.

mod distributed;
mod entry;
mod reader;
mod stats;
mod store;


// Re-export public types
pub use distributed::{DistributedCache, InProcessDistributedCache};
pub use entry::{CacheEntry, ExpirationPolicy};
pub use reader::{LocalTierReader, LocalTodoCache, SharedTierReader, TodoReader, ALL_TODOS_KEY};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
