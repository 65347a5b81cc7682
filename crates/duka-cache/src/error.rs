//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A stored value could not be encoded or decoded as JSON.
    #[error("Cache value encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No live entry: never written, deleted, or past its TTL.
    #[error("No live entry for key: {0}")]
    NotFound(String),
}
