//! Cache Module
//!
//! In-process TTL storage and the statistics registry shared by the
//! coordinator.

mod entry;
mod stats;
pub(crate) mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{hit_rate, CacheStats, StatsRegistry};
pub use store::{InProcessStore, SharedEntries};

// == Public Constants ==
/// Default interval between active-expiry sweeps of the in-process store
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
