//! Type-safe key-value caching layer for Duka.
//!
//! An in-process store with per-entry expiry and automatic JSON
//! serialization. Sessions are built on top of it.
//!
//! # Example
//!
//! ```rust
//! use duka_cache::{cache_key, Cache};
//! use std::time::Duration;
//!
//! let cache = Cache::new();
//! let key = cache_key!("quote", "arusha");
//!
//! cache.set_with_ttl(&key, &15_000_i64, Duration::from_secs(60)).unwrap();
//! let fee: Option<i64> = cache.get(&key).unwrap();
//! assert_eq!(fee, Some(15_000));
//!
//! cache.delete(&key);
//! assert!(!cache.exists(&key));
//! ```

mod error;
mod kv;
mod token;

pub use error::CacheError;
pub use kv::{Cache, SWEEP_EVERY};
pub use token::generate_token;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, generate_token, Cache, CacheError};
}
