//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired in-process entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
