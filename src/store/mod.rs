//! Persistence layer. Remembers the last recommendation per segment.
//!
//! Storage is a convenience: neither operation can fail from the caller's
//! point of view. Backends log their failures and report a miss instead.

pub mod libsql_backend;
pub mod memory;
mod migrations;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Durable key/value storage for saved recommendations.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Stored value for `key`, or `None` if absent or unreadable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. Failures are logged and dropped.
    async fn set(&self, key: &str, value: &str);
}
