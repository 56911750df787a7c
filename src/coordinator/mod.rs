//! Coordinator Module
//!
//! Orchestrates the in-process and distributed tiers behind one API.
//!
//! # Operations
//! - `get` / `get_with` - Read-through with L1 backfill
//! - `set` / `set_with` - Write-through with the in-process TTL ceiling
//! - `delete` / `delete_many` - Delete-through
//! - `get_or_set` / `try_get_or_set` - Compute on miss
//! - `has` - Existence check
//! - `flush` / `flush_l1` / `flush_all` - Clear tiers
//! - `stats` / `reset_stats` - Counters

mod options;
mod tiered;

pub use options::CacheOptions;
pub use tiered::CacheCoordinator;
