//! Per-call cache options.

use std::time::Duration;

/// Per-call tier selection and TTL requests. Never persisted.
///
/// Unset TTLs fall back to the coordinator's
/// [`CacheConfig`](crate::config::CacheConfig) defaults. Whatever is
/// requested, the in-process TTL is capped at the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Consult and write the in-process tier
    pub enable_l1: bool,
    /// Consult and write the distributed tier
    pub enable_l2: bool,
    /// Requested in-process TTL
    pub l1_ttl: Option<Duration>,
    /// Requested distributed TTL
    pub l2_ttl: Option<Duration>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enable_l1: true,
            enable_l2: true,
            l1_ttl: None,
            l2_ttl: None,
        }
    }
}

impl CacheOptions {
    /// Bypass the distributed tier.
    pub fn l1_only() -> Self {
        Self {
            enable_l2: false,
            ..Self::default()
        }
    }

    /// Bypass the in-process tier.
    pub fn l2_only() -> Self {
        Self {
            enable_l1: false,
            ..Self::default()
        }
    }

    /// Requests an L1 lifetime; still capped at the configured ceiling.
    pub fn with_l1_ttl(mut self, ttl: Duration) -> Self {
        self.l1_ttl = Some(ttl);
        self
    }

    /// Requests an L2 lifetime.
    pub fn with_l2_ttl(mut self, ttl: Duration) -> Self {
        self.l2_ttl = Some(ttl);
        self
    }
}
