//! Key-value store abstraction for ProPass.
//!
//! The token lifecycle engine only needs four operations from its
//! durable store: get, set-with-TTL, delete, and pattern listing.
//! This crate defines that seam and ships two backends:
//!
//! - [`RedisRestStore`] — an Upstash-compatible Redis REST client,
//!   used in production
//! - [`MemoryStore`] — an in-process TTL-aware map, used by tests and
//!   local runs

mod error;
mod memory;
mod redis_rest;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis_rest::{RedisRestConfig, RedisRestStore};

use async_trait::async_trait;

/// Abstract key-value store interface.
///
/// Implementations must provide per-key atomicity for single get/set/
/// delete calls; no multi-key transactions are assumed anywhere.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` at `key`. When `ttl_seconds` is set the key
    /// expires after that many seconds; otherwise it persists until
    /// overwritten or deleted.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()>;

    /// Deletes `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Lists keys matching a glob `pattern` (`*` wildcard). Used only
    /// by housekeeping, never by the lifecycle operations.
    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;
}
