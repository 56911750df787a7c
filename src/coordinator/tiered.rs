//! Tiered cache coordinator.
//!
//! Read-through, write-through and delete-through across the in-process
//! tier (L1) and an optional distributed tier (L2). L2 faults never reach
//! the caller: reads fail open, existence checks fail closed, writes and
//! deletes are logged and dropped.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::CacheOptions;
use crate::backend::DistributedCache;
use crate::cache::{CacheStats, InProcessStore, StatsRegistry};
use crate::config::CacheConfig;

// == Cache Coordinator ==
/// Owns the in-process store and the statistics for one process.
///
/// Construct once, share as `Arc<CacheCoordinator>`, and call
/// [`shutdown`](Self::shutdown) on the way out.
pub struct CacheCoordinator {
    config: CacheConfig,
    local: InProcessStore<Value>,
    remote: Option<Arc<dyn DistributedCache>>,
    stats: StatsRegistry,
}

impl CacheCoordinator {
    // == Constructors ==
    /// Creates a coordinator, starting the in-process sweep on the current
    /// tokio runtime if there is one.
    pub fn new(config: CacheConfig, remote: Option<Arc<dyn DistributedCache>>) -> Self {
        info!(
            l1_ttl_ceiling_s = config.l1_ttl_ceiling.as_secs(),
            default_l1_ttl_s = config.default_l1_ttl.as_secs(),
            default_l2_ttl_s = config.default_l2_ttl.as_secs(),
            backend = remote.as_ref().map_or("none", |r| r.name()),
            "cache coordinator initialized"
        );

        Self {
            local: InProcessStore::new(config.sweep_interval),
            config,
            remote,
            stats: StatsRegistry::new(),
        }
    }

    /// Creates a coordinator over `backend` as its distributed tier.
    pub fn with_backend(config: CacheConfig, backend: Arc<dyn DistributedCache>) -> Self {
        Self::new(config, Some(backend))
    }

    /// A coordinator with no distributed tier; `enable_l2` is then a no-op.
    pub fn local_only(config: CacheConfig) -> Self {
        Self::new(config, None)
    }

    /// The settings this coordinator was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == TTL Policy ==
    /// `min(requested, ceiling)` where the request falls back to the
    /// per-call option and then to the configured default.
    pub fn effective_l1_ttl(&self, ttl: Option<Duration>, options: &CacheOptions) -> Duration {
        ttl.or(options.l1_ttl)
            .unwrap_or(self.config.default_l1_ttl)
            .min(self.config.l1_ttl_ceiling)
    }

    /// The request, else the per-call option, else the configured default.
    /// L2 is not capped.
    pub fn effective_l2_ttl(&self, ttl: Option<Duration>, options: &CacheOptions) -> Duration {
        ttl.or(options.l2_ttl).unwrap_or(self.config.default_l2_ttl)
    }

    // == Get ==
    /// Reads `key` with default options (both tiers).
    ///
    /// # Arguments
    /// * `key` - The cache key
    ///
    /// # Returns
    /// * `Some(value)` on a hit in either tier that decodes as `T`
    /// * `None` on a miss, a cached `null`, or an unreachable L2
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with(key, &CacheOptions::default()).await
    }

    /// Reads L1, then L2 on a miss, backfilling L1 from an L2 hit.
    ///
    /// An L1 hit never touches L2. An unreachable L2 reads as a miss.
    pub async fn get_with<T: DeserializeOwned>(&self, key: &str, options: &CacheOptions) -> Option<T> {
        if options.enable_l1 {
            let cached = self
                .local
                .get(key)
                .filter(|value| !value.is_null())
                .and_then(|value| decode::<T>(key, "in-process", &value));
            if let Some(decoded) = cached {
                self.stats.record_l1_hit();
                return Some(decoded);
            }
            self.stats.record_l1_miss();
        }

        if !options.enable_l2 {
            return None;
        }
        let remote = self.remote.as_deref()?;

        let fetched = self.fetch_remote(remote, key).await;
        let Some((value, decoded)) =
            fetched.and_then(|value| decode::<T>(key, remote.name(), &value).map(|d| (value, d)))
        else {
            self.stats.record_l2_miss();
            return None;
        };

        self.stats.record_l2_hit();
        if options.enable_l1 {
            self.local
                .set(key, value, self.effective_l1_ttl(None, options));
        }
        Some(decoded)
    }

    // == Set ==
    /// Writes `value` to both tiers.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `value` - Any serializable value
    /// * `ttl` - Requested lifetime; L1 caps it at the configured ceiling
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        self.set_with(key, value, ttl, &CacheOptions::default()).await
    }

    /// Writes L1, then L2.
    ///
    /// A failed L2 write is logged and leaves the tiers diverged until the
    /// L1 entry expires; the L1 write is not rolled back.
    pub async fn set_with<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        options: &CacheOptions,
    ) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                error!(key, error = %err, "value could not be serialized; not cached");
                return;
            }
        };

        let remote = self.remote.as_deref().filter(|_| options.enable_l2);
        let payload = remote.map(|_| value.to_string());

        if options.enable_l1 {
            self.local
                .set(key, value, self.effective_l1_ttl(ttl, options));
        }

        if let (Some(remote), Some(payload)) = (remote, payload) {
            let ttl_ms = millis(self.effective_l2_ttl(ttl, options));
            if let Err(err) = remote.set(key, payload, ttl_ms).await {
                warn!(
                    backend = remote.name(),
                    key,
                    error = %err,
                    "distributed cache write failed; tiers diverge until the in-process entry expires"
                );
            }
        }
    }

    // == Delete ==
    /// Removes `key` from both tiers.
    pub async fn delete(&self, key: &str) {
        self.delete_many(&[key]).await
    }

    /// Removes the keys from L1, then from L2. An L2 failure is logged and
    /// neither retried nor rolled back.
    pub async fn delete_many<K: AsRef<str>>(&self, keys: &[K]) {
        let removed = self.local.delete_many(keys);
        debug!(requested = keys.len(), removed, "in-process cache delete");

        let Some(remote) = self.remote.as_deref() else {
            return;
        };
        if keys.is_empty() {
            return;
        }

        let keys: Vec<String> = keys.iter().map(|key| key.as_ref().to_owned()).collect();
        match remote.delete(&keys).await {
            Ok(deleted) => debug!(backend = remote.name(), deleted, "distributed cache delete"),
            Err(err) => warn!(
                backend = remote.name(),
                keys = ?keys,
                error = %err,
                "distributed cache delete failed"
            ),
        }
    }

    // == Get Or Set ==
    /// [`get_or_set_with`](Self::get_or_set_with) with default options.
    pub async fn get_or_set<T, F, Fut>(&self, key: &str, factory: F, ttl: Option<Duration>) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        self.get_or_set_with(key, factory, ttl, &CacheOptions::default())
            .await
    }

    /// Returns the cached value, or runs `factory` and caches a `Some` result.
    ///
    /// `None` is returned without being cached, so the next call runs the
    /// factory again. Concurrent misses each run their own factory.
    pub async fn get_or_set_with<T, F, Fut>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
        options: &CacheOptions,
    ) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let result = self
            .try_get_or_set_with(
                key,
                move || async move { Ok::<_, Infallible>(factory().await) },
                ttl,
                options,
            )
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// [`try_get_or_set_with`](Self::try_get_or_set_with) with default options.
    pub async fn try_get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        self.try_get_or_set_with(key, factory, ttl, &CacheOptions::default())
            .await
    }

    /// Like [`get_or_set_with`](Self::get_or_set_with) for a fallible factory.
    ///
    /// Only the factory's own error is returned; nothing is cached for it.
    pub async fn try_get_or_set_with<T, E, F, Fut>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
        options: &CacheOptions,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(cached) = self.get_with::<T>(key, options).await {
            return Ok(Some(cached));
        }

        let produced = factory().await?;
        if let Some(value) = &produced {
            self.set_with(key, value, ttl, options).await;
        }
        Ok(produced)
    }

    // == Has ==
    /// Whether either tier holds a non-null value for `key`.
    ///
    /// # Returns
    /// * `true` if L1 or L2 holds the key
    /// * `false` if neither does, or if L2 could not be asked
    pub async fn has(&self, key: &str) -> bool {
        self.has_with(key, &CacheOptions::default()).await
    }

    /// Existence check; an L2 failure answers `false`. Records no stats.
    ///
    /// A cached JSON `null` counts as absent in both tiers, as in
    /// [`get_with`](Self::get_with).
    pub async fn has_with(&self, key: &str, options: &CacheOptions) -> bool {
        let cached = options.enable_l1
            && self
                .local
                .get(key)
                .is_some_and(|value| !value.is_null());
        if cached {
            return true;
        }
        if !options.enable_l2 {
            return false;
        }
        match self.remote.as_deref() {
            Some(remote) => self.fetch_remote(remote, key).await.is_some(),
            None => false,
        }
    }

    // == Flush ==
    /// Clears the in-process tier only. The distributed tier may be shared
    /// with other processes and is left untouched.
    pub fn flush(&self) {
        self.local.clear();
        info!("in-process cache flushed");
    }

    /// Same effect as [`flush`](Self::flush); resets local state only.
    pub fn flush_l1(&self) {
        self.flush();
    }

    /// Clears both tiers. Returns whether the distributed tier was cleared
    /// (trivially true when none is attached).
    pub async fn flush_all(&self) -> bool {
        self.flush();

        let Some(remote) = self.remote.as_deref() else {
            return true;
        };
        match remote.flush().await {
            Ok(()) => {
                info!(backend = remote.name(), "distributed cache flushed");
                true
            }
            Err(err) => {
                warn!(backend = remote.name(), error = %err, "distributed cache flush failed");
                false
            }
        }
    }

    // == Stats ==
    /// Snapshot of the hit/miss counters and the derived hit rate.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Zeroes every counter.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    // == Diagnostics ==
    /// Absolute expiry of `key` in the in-process tier.
    pub fn l1_expiry(&self, key: &str) -> Option<DateTime<Utc>> {
        self.local.ttl_of(key)
    }

    /// Snapshot of unexpired in-process keys.
    pub fn l1_keys(&self) -> Vec<String> {
        self.local.keys()
    }

    // == Shutdown ==
    /// Stops the in-process sweep and releases its entries. Never fails;
    /// calling it twice is harmless.
    pub fn shutdown(&self) {
        self.local.close();
        info!("cache coordinator shut down");
    }

    async fn fetch_remote(&self, remote: &dyn DistributedCache, key: &str) -> Option<Value> {
        match remote.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str::<Value>(&payload) {
                Ok(Value::Null) => None,
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(
                        backend = remote.name(),
                        key,
                        error = %err,
                        "undecodable distributed cache payload"
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(
                    backend = remote.name(),
                    key,
                    error = %err,
                    "distributed cache read failed"
                );
                None
            }
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, tier: &str, value: &Value) -> Option<T> {
    match <T as Deserialize>::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(key, tier, error = %err, "cached value has an unexpected shape");
            None
        }
    }
}

/// Whole milliseconds for the distributed tier, rounded up so a non-zero
/// TTL never becomes 0.
fn millis(ttl: Duration) -> u64 {
    let whole = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    if ttl.subsec_nanos() % 1_000_000 == 0 {
        whole
    } else {
        whole.saturating_add(1)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::{CacheError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn coordinator() -> (CacheCoordinator, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::without_sweep());
        let coordinator = CacheCoordinator::with_backend(CacheConfig::default(), backend.clone());
        (coordinator, backend)
    }

    /// Backend that only knows the mandatory operations.
    struct NoFlushBackend;

    #[async_trait]
    impl DistributedCache for NoFlushBackend {
        fn name(&self) -> &'static str {
            "no-flush"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _payload: String, _ttl_ms: u64) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _keys: &[String]) -> Result<u64> {
            Err(CacheError::Internal("delete refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (cache, _backend) = coordinator();

        cache.set("user:1", &serde_json::json!({"name": "ada"}), None).await;

        let value: Option<Value> = cache.get("user:1").await;
        assert_eq!(value, Some(serde_json::json!({"name": "ada"})));
    }

    #[tokio::test]
    async fn test_l1_hit_skips_distributed_tier() {
        let (cache, backend) = coordinator();
        cache.set("k", &1u32, None).await;

        let value: Option<u32> = cache.get("k").await;

        assert_eq!(value, Some(1));
        assert_eq!(backend.calls().gets, 0);
        let stats = cache.stats();
        assert_eq!(stats.l1_hits, 1);
        assert_eq!(stats.l1_misses, 0);
    }

    #[tokio::test]
    async fn test_l2_hit_backfills_l1() {
        let (cache, backend) = coordinator();
        backend.set("k", "\"remote\"".to_string(), 60_000).await.unwrap();

        let first: Option<String> = cache.get("k").await;
        let second: Option<String> = cache.get("k").await;

        assert_eq!(first.as_deref(), Some("remote"));
        assert_eq!(second.as_deref(), Some("remote"));
        assert_eq!(backend.calls().gets, 1);

        let stats = cache.stats();
        assert_eq!((stats.l1_hits, stats.l1_misses), (1, 1));
        assert_eq!((stats.l2_hits, stats.l2_misses), (1, 0));
    }

    #[tokio::test]
    async fn test_backfill_respects_ceiling() {
        let (cache, backend) = coordinator();
        backend.set("k", "1".to_string(), 3_600_000).await.unwrap();
        let options = CacheOptions::default().with_l1_ttl(Duration::from_secs(3600));

        let before = Utc::now();
        let _: Option<u32> = cache.get_with("k", &options).await;
        let after = Utc::now();

        let expires_at = cache.l1_expiry("k").unwrap();
        assert!(expires_at >= before + chrono::Duration::seconds(60));
        assert!(expires_at <= after + chrono::Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_get_fails_open_on_l2_error() {
        let (cache, backend) = coordinator();
        backend.set_unavailable(true);

        let value: Option<String> = cache.get_with("k", &CacheOptions::l2_only()).await;

        assert!(value.is_none());
        let stats = cache.stats();
        assert_eq!(stats.l2_misses, 1);
        assert_eq!(stats.l1_misses, 0);
    }

    #[tokio::test]
    async fn test_get_treats_null_as_absent() {
        let (cache, backend) = coordinator();
        backend.set("remote-null", "null".to_string(), 60_000).await.unwrap();
        cache.set("local-null", &Option::<u32>::None, None).await;

        let local: Option<Value> = cache.get_with("local-null", &CacheOptions::l1_only()).await;
        let remote: Option<Value> = cache.get_with("remote-null", &CacheOptions::l2_only()).await;

        assert!(local.is_none());
        assert!(remote.is_none());
    }

    #[tokio::test]
    async fn test_get_wrong_shape_is_miss() {
        let (cache, backend) = coordinator();
        backend.set("k", "\"text\"".to_string(), 60_000).await.unwrap();

        let value: Option<u64> = cache.get("k").await;

        assert!(value.is_none());
        assert_eq!(cache.stats().l2_misses, 1);
        assert!(cache.l1_expiry("k").is_none(), "undecodable value must not be backfilled");
    }

    #[tokio::test]
    async fn test_set_caps_l1_ttl_and_converts_l2_ttl() {
        let (cache, backend) = coordinator();

        let before = Utc::now();
        cache.set("k", &"v", Some(Duration::from_secs(3600))).await;
        let after = Utc::now();

        let expires_at = cache.l1_expiry("k").unwrap();
        assert!(expires_at >= before + chrono::Duration::seconds(60));
        assert!(expires_at <= after + chrono::Duration::seconds(60));
        assert_eq!(backend.peek("k").as_deref(), Some("\"v\""));
    }

    #[test]
    fn test_effective_ttls() {
        let cache = CacheCoordinator::local_only(CacheConfig::default());
        let options = CacheOptions::default()
            .with_l1_ttl(Duration::from_secs(10))
            .with_l2_ttl(Duration::from_secs(900));

        assert_eq!(cache.effective_l1_ttl(None, &options), Duration::from_secs(10));
        assert_eq!(cache.effective_l2_ttl(None, &options), Duration::from_secs(900));
        assert_eq!(
            cache.effective_l1_ttl(Some(Duration::from_secs(120)), &options),
            Duration::from_secs(60)
        );
        assert_eq!(
            cache.effective_l2_ttl(Some(Duration::from_secs(120)), &options),
            Duration::from_secs(120)
        );
        assert_eq!(
            cache.effective_l2_ttl(None, &CacheOptions::default()),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_secs(2)), 2_000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_millis_rounds_sub_millisecond_up() {
        assert_eq!(millis(Duration::from_micros(1)), 1);
        assert_eq!(millis(Duration::from_micros(1_500)), 2);
        assert_eq!(millis(Duration::ZERO), 0);
    }

    /// Backend that records the TTL of every write.
    #[derive(Default)]
    struct TtlRecorder {
        ttls: parking_lot::Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl DistributedCache for TtlRecorder {
        fn name(&self) -> &'static str {
            "ttl-recorder"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _payload: String, ttl_ms: u64) -> Result<()> {
            self.ttls.lock().push(ttl_ms);
            Ok(())
        }

        async fn delete(&self, keys: &[String]) -> Result<u64> {
            Ok(keys.len() as u64)
        }
    }

    #[tokio::test]
    async fn test_sub_millisecond_ttl_reaches_l2_as_one_ms() {
        let recorder = Arc::new(TtlRecorder::default());
        let cache = CacheCoordinator::with_backend(CacheConfig::default(), recorder.clone());

        cache.set("k", &"v", Some(Duration::from_micros(500))).await;
        cache.set("k", &"v", Some(Duration::from_millis(1_500))).await;

        assert_eq!(*recorder.ttls.lock(), vec![1, 1_500]);
    }

    #[tokio::test]
    async fn test_set_survives_l2_failure() {
        let (cache, backend) = coordinator();
        backend.set_unavailable(true);

        cache.set("k", &"fresh", None).await;

        let value: Option<String> = cache.get("k").await;
        assert_eq!(value.as_deref(), Some("fresh"));
        assert_eq!(backend.calls().sets, 1);
    }

    #[tokio::test]
    async fn test_set_respects_tier_bypass() {
        let (cache, backend) = coordinator();

        cache.set_with("local", &1, None, &CacheOptions::l1_only()).await;
        cache.set_with("remote", &2, None, &CacheOptions::l2_only()).await;

        assert!(backend.peek("local").is_none());
        assert!(cache.l1_expiry("remote").is_none());
        assert_eq!(backend.peek("remote").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_delete_survives_l2_failure() {
        let (cache, backend) = coordinator();
        cache.set("k", &"v", None).await;
        backend.set_unavailable(true);

        cache.delete("k").await;

        let value: Option<String> = cache.get_with("k", &CacheOptions::l1_only()).await;
        assert!(value.is_none());
        assert_eq!(backend.calls().deletes, 1);
        // The distributed copy survives the failed delete
        assert_eq!(backend.peek("k").as_deref(), Some("\"v\""));
    }

    #[tokio::test]
    async fn test_delete_error_from_backend_is_swallowed() {
        let cache = CacheCoordinator::with_backend(CacheConfig::default(), Arc::new(NoFlushBackend));
        cache.set("k", &"v", None).await;

        cache.delete_many(&["k", "other"]).await;

        assert!(cache.l1_keys().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_set_runs_factory_once() {
        let (cache, _backend) = coordinator();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let first = cache
            .get_or_set(
                "k",
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Some("computed".to_string())
                },
                None,
            )
            .await;
        let second = cache
            .get_or_set(
                "k",
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Some("other".to_string())
                },
                None,
            )
            .await;

        assert_eq!(first.as_deref(), Some("computed"));
        assert_eq!(second.as_deref(), Some("computed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_does_not_cache_none() {
        let (cache, backend) = coordinator();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let value: Option<String> = cache
                .get_or_set(
                    "missing",
                    move || async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        None
                    },
                    None,
                )
                .await;
            assert!(value.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(backend.calls().sets, 0);
    }

    #[tokio::test]
    async fn test_get_or_set_returns_value_when_l2_write_fails() {
        let (cache, backend) = coordinator();
        backend.set_unavailable(true);

        let value = cache
            .get_or_set("k", || async { Some(7u32) }, None)
            .await;

        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn test_try_get_or_set_propagates_factory_error() {
        let (cache, backend) = coordinator();

        let result: std::result::Result<Option<u32>, &str> = cache
            .try_get_or_set("k", || async { Err("database down") }, None)
            .await;

        assert_eq!(result, Err("database down"));
        assert_eq!(backend.calls().sets, 0);
        assert!(cache.l1_keys().is_empty());
    }

    #[tokio::test]
    async fn test_has() {
        let (cache, backend) = coordinator();
        cache.set_with("local", &1, None, &CacheOptions::l1_only()).await;
        backend.set("remote", "1".to_string(), 60_000).await.unwrap();

        assert!(cache.has("local").await);
        assert!(cache.has("remote").await);
        assert!(!cache.has("missing").await);
        assert!(!cache.has_with("local", &CacheOptions::l2_only()).await);

        let stats = cache.stats();
        assert_eq!(stats.l1_hits + stats.l1_misses + stats.l2_hits + stats.l2_misses, 0);
    }

    #[tokio::test]
    async fn test_has_treats_null_as_absent_in_every_tier() {
        let (cache, _backend) = coordinator();
        cache.set("k", &Option::<u32>::None, None).await;

        assert_eq!(cache.get::<u32>("k").await, None);
        assert!(!cache.has("k").await);
        assert!(!cache.has_with("k", &CacheOptions::l1_only()).await);
        assert!(!cache.has_with("k", &CacheOptions::l2_only()).await);
    }

    #[tokio::test]
    async fn test_has_fails_closed_on_l2_error() {
        let (cache, backend) = coordinator();
        backend.set("remote", "1".to_string(), 60_000).await.unwrap();
        backend.set_unavailable(true);

        assert!(!cache.has("remote").await);
    }

    #[tokio::test]
    async fn test_flush_leaves_distributed_tier() {
        let (cache, backend) = coordinator();
        cache.set("k", &"v", None).await;

        cache.flush();

        assert!(cache.l1_keys().is_empty());
        assert!(backend.peek("k").is_some());

        cache.set("k2", &"v", None).await;
        cache.flush_l1();
        assert!(cache.l1_keys().is_empty());
        assert_eq!(backend.calls().flushes, 0);
    }

    #[tokio::test]
    async fn test_flush_all() {
        let (cache, backend) = coordinator();
        cache.set("k", &"v", None).await;

        assert!(cache.flush_all().await);

        assert!(cache.l1_keys().is_empty());
        assert!(backend.peek("k").is_none());
    }

    #[tokio::test]
    async fn test_flush_all_unsupported_backend() {
        let cache = CacheCoordinator::with_backend(CacheConfig::default(), Arc::new(NoFlushBackend));
        cache.set("k", &"v", None).await;

        assert!(!cache.flush_all().await);
        assert!(cache.l1_keys().is_empty());
    }

    #[tokio::test]
    async fn test_local_only_coordinator() {
        let cache = CacheCoordinator::local_only(CacheConfig::default());
        cache.set("k", &5u8, None).await;

        assert_eq!(cache.get::<u8>("k").await, Some(5));
        assert_eq!(cache.get::<u8>("missing").await, None);
        assert!(cache.flush_all().await);

        let stats = cache.stats();
        assert_eq!(stats.l1_misses, 1);
        assert_eq!(stats.l2_misses, 0, "no distributed tier, no distributed misses");
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let (cache, _backend) = coordinator();
        let _: Option<u8> = cache.get("missing").await;
        assert_eq!(cache.stats().l1_misses, 1);

        cache.reset_stats();

        assert_eq!(cache.stats().l1_misses, 0);
        assert_eq!(cache.stats().l2_misses, 0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (cache, _backend) = coordinator();
        cache.set("k", &"v", None).await;

        cache.shutdown();
        cache.shutdown();

        assert!(cache.l1_keys().is_empty());
    }
}
