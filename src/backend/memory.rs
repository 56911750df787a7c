//! In-memory distributed cache backend.
//!
//! Stands in for a network cache when running a single process or in tests.
//! Counts calls and can simulate an outage.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::DistributedCache;
use crate::cache::InProcessStore;
use crate::error::{CacheError, Result};

/// Number of calls a [`MemoryBackend`] has received, failed ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendCalls {
    pub gets: u64,
    pub sets: u64,
    pub deletes: u64,
    pub flushes: u64,
}

#[derive(Debug, Default)]
struct CallCounters {
    gets: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    flushes: AtomicU64,
}

/// Distributed cache contract implemented over an [`InProcessStore`].
#[derive(Debug)]
pub struct MemoryBackend {
    store: InProcessStore<String>,
    unavailable: AtomicBool,
    calls: CallCounters,
}

impl MemoryBackend {
    /// Creates a backend sweeping expired payloads every `sweep_interval`.
    pub fn new(sweep_interval: Duration) -> Self {
        Self::from_store(InProcessStore::new(sweep_interval))
    }

    /// Creates a backend that expires payloads lazily only.
    pub fn without_sweep() -> Self {
        Self::from_store(InProcessStore::without_sweep())
    }

    fn from_store(store: InProcessStore<String>) -> Self {
        Self {
            store,
            unavailable: AtomicBool::new(false),
            calls: CallCounters::default(),
        }
    }

    /// Makes every subsequent call fail with [`CacheError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    /// Snapshot of how many times each operation was called.
    ///
    /// # Returns
    /// Counts per operation, including calls rejected by a simulated outage
    pub fn calls(&self) -> BackendCalls {
        BackendCalls {
            gets: self.calls.gets.load(Ordering::Relaxed),
            sets: self.calls.sets.load(Ordering::Relaxed),
            deletes: self.calls.deletes.load(Ordering::Relaxed),
            flushes: self.calls.flushes.load(Ordering::Relaxed),
        }
    }

    /// Raw payload lookup that bypasses call counting and outage simulation.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(CacheError::Unavailable(
                "memory backend is simulating an outage".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::without_sweep()
    }
}

#[async_trait]
impl DistributedCache for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.calls.gets.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;
        Ok(self.store.get(key))
    }

    async fn set(&self, key: &str, payload: String, ttl_ms: u64) -> Result<()> {
        self.calls.sets.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;
        self.store.set(key, payload, Duration::from_millis(ttl_ms));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        self.calls.deletes.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;
        Ok(self.store.delete_many(keys) as u64)
    }

    async fn flush(&self) -> Result<()> {
        self.calls.flushes.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;
        self.store.clear();
        Ok(())
    }
}
