//! Tiered Cache - A two-level cache coordinator
//!
//! Serves reads from a fast in-process tier backed by a shared distributed
//! tier, with a TTL ceiling that bounds in-process staleness and failure
//! isolation that keeps a distributed outage from ever surfacing as an error.

pub mod backend;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub(crate) mod tasks;

pub use backend::{DistributedCache, MemoryBackend};
pub use cache::{CacheStats, InProcessStore};
pub use config::{CacheConfig, Config};
pub use coordinator::{CacheCoordinator, CacheOptions};
pub use error::CacheError;
