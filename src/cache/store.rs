//! Cache Store Module
//!
//! In-process TTL store: a shared HashMap with lazy expiry on read and an
//! optional background sweep that bounds memory independent of read traffic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::tasks::spawn_cleanup_task;

/// Entry map shared between a store and its sweep task.
pub type SharedEntries<V> = Arc<RwLock<HashMap<String, CacheEntry<V>>>>;

// == In-Process Store ==
/// Per-key TTL container used as the coordinator's L1 tier.
///
/// None of the operations can fail. Expired entries are never returned.
#[derive(Debug)]
pub struct InProcessStore<V> {
    /// Key-value storage
    entries: SharedEntries<V>,
    /// Active-expiry task, if one is running
    sweeper: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<V> InProcessStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a store whose expired entries are swept every `sweep_interval`.
    ///
    /// The sweep runs on the current tokio runtime. Outside a runtime, or
    /// with a zero interval, the store falls back to lazy expiry only.
    pub fn new(sweep_interval: Duration) -> Self {
        let entries: SharedEntries<V> = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = spawn_cleanup_task(entries.clone(), sweep_interval);

        Self {
            entries,
            sweeper: Mutex::new(sweeper),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a store without a background sweep.
    pub fn without_sweep() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sweeper: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    // == Get ==
    /// Returns the value if present and unexpired.
    ///
    /// Expired entries are left in place for the sweep.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Utc::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Inserts or overwrites `key`, expiring `ttl` from now.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        // `close` flips the flag under this lock, so no write lands after it clears
        let mut entries = self.entries.write();
        if self.is_closed() {
            warn!(key = %key, "write to in-process cache after close ignored");
            return;
        }
        entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was held for it.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Removes every key in `keys`, returning how many entries were held.
    pub fn delete_many<K: AsRef<str>>(&self, keys: &[K]) -> usize {
        let mut entries = self.entries.write();
        let mut removed = 0;
        for key in keys {
            if entries.remove(key.as_ref()).is_some() {
                removed += 1;
            }
        }
        removed
    }

    // == Has ==
    /// Existence check; does not extend the entry's TTL.
    pub fn has(&self, key: &str) -> bool {
        let now = Utc::now();
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Keys ==
    /// Snapshot of all currently unexpired keys.
    pub fn keys(&self) -> Vec<String> {
        let now = Utc::now();
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == TTL Of ==
    /// Absolute expiry of an unexpired entry.
    pub fn ttl_of(&self, key: &str) -> Option<DateTime<Utc>> {
        let now = Utc::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.expires_at)
    }

    // == Clear ==
    /// Removes all entries immediately.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    // == Cleanup Expired ==
    /// Runs one sweep pass and returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        purge_expired(&self.entries)
    }

    // == Length ==
    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    // == Close ==
    /// Stops the sweep and releases all entries.
    ///
    /// Safe to call more than once and during shutdown; never panics.
    pub fn close(&self) {
        let mut entries = self.entries.write();
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("in-process cache already closed");
            return;
        }
        entries.clear();
        drop(entries);

        if let Some(handle) = self.sweeper.lock().take() {
            if handle.is_finished() {
                warn!("in-process cache sweep had already stopped before close");
            }
            handle.abort();
        }

        debug!("in-process cache closed");
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<V> Drop for InProcessStore<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

/// Removes every expired entry from `entries`, returning how many went.
pub(crate) fn purge_expired<V>(entries: &SharedEntries<V>) -> usize {
    let now = Utc::now();
    let mut entries = entries.write();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired_at(now));
    before - entries.len()
}
