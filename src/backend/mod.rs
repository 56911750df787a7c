//! Distributed Cache Backend Module
//!
//! The contract the coordinator needs from the shared (L2) cache tier, plus
//! an in-memory implementation for local runs and tests.

mod memory;

use async_trait::async_trait;

use crate::error::{CacheError, Result};

pub use memory::{BackendCalls, MemoryBackend};

/// A shared key-value cache with per-key TTL, reachable by every process.
///
/// Every call is fallible; the coordinator absorbs the errors. Payloads are
/// JSON documents produced by the coordinator.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    /// A name for logs, e.g. "memory" or "redis".
    fn name(&self) -> &'static str;

    /// Returns the stored payload, or `None` for a miss.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `payload` under `key` for `ttl_ms` milliseconds.
    async fn set(&self, key: &str, payload: String, ttl_ms: u64) -> Result<()>;

    /// Removes the keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Removes every key. Backends shared with other tenants may refuse.
    async fn flush(&self) -> Result<()> {
        Err(CacheError::Unsupported("flush"))
    }
}
