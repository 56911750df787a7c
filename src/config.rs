//! Configuration Module
//!
//! Coordinator tuning ([`CacheConfig`]) and process configuration loaded
//! from environment variables ([`Config`]).

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_SWEEP_INTERVAL_SECS;

/// Tuning for one [`CacheCoordinator`](crate::CacheCoordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Hard upper bound on any in-process TTL
    pub l1_ttl_ceiling: Duration,
    /// In-process TTL used when the caller requests none
    pub default_l1_ttl: Duration,
    /// Distributed TTL used when the caller requests none
    pub default_l2_ttl: Duration,
    /// Interval between active-expiry sweeps of the in-process store
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            l1_ttl_ceiling: Duration::from_secs(60),
            default_l1_ttl: Duration::from_secs(60),
            default_l2_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ceiling for in-process TTLs, in seconds
    pub l1_ttl_ceiling: u64,
    /// Default in-process TTL in seconds
    pub default_l1_ttl: u64,
    /// Default distributed TTL in seconds
    pub default_l2_ttl: u64,
    /// In-process sweep interval in seconds
    pub sweep_interval: u64,
    /// Whether to attach a distributed tier at all
    pub l2_enabled: bool,
    /// Interval between periodic stats log lines, in seconds
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_L1_TTL_CEILING` - In-process TTL ceiling in seconds (default: 60)
    /// - `CACHE_L1_TTL` - Default in-process TTL in seconds (default: 60)
    /// - `CACHE_L2_TTL` - Default distributed TTL in seconds (default: 300)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `CACHE_L2_ENABLED` - `true`/`false` (default: true)
    /// - `CACHE_STATS_INTERVAL` - Stats log frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            l1_ttl_ceiling: env_or("CACHE_L1_TTL_CEILING", defaults.l1_ttl_ceiling),
            default_l1_ttl: env_or("CACHE_L1_TTL", defaults.default_l1_ttl),
            default_l2_ttl: env_or("CACHE_L2_TTL", defaults.default_l2_ttl),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval),
            l2_enabled: env_or("CACHE_L2_ENABLED", defaults.l2_enabled),
            stats_interval: env_or("CACHE_STATS_INTERVAL", defaults.stats_interval),
        }
    }

    /// The coordinator settings described by this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            l1_ttl_ceiling: Duration::from_secs(self.l1_ttl_ceiling),
            default_l1_ttl: Duration::from_secs(self.default_l1_ttl),
            default_l2_ttl: Duration::from_secs(self.default_l2_ttl),
            sweep_interval: Duration::from_secs(self.sweep_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            l1_ttl_ceiling: 60,
            default_l1_ttl: 60,
            default_l2_ttl: 300,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            l2_enabled: true,
            stats_interval: 60,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
