//! Error types for the distributed cache tier
//!
//! Provides unified error handling using thiserror. These errors only ever
//! travel between a [`DistributedCache`](crate::backend::DistributedCache)
//! implementation and the coordinator; the coordinator logs and absorbs them.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for distributed cache backends.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend could not be reached or refused the request
    #[error("Distributed cache unavailable: {0}")]
    Unavailable(String),

    /// Backend does not implement the requested operation
    #[error("Operation not supported by backend: {0}")]
    Unsupported(&'static str),

    /// Backend reported an internal failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other driver-level error surfaced by a backend adapter
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

// == Result Type Alias ==
/// Convenience Result type for backend operations.
pub type Result<T> = std::result::Result<T, CacheError>;
