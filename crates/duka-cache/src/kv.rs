//! Key-value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Every this many writes, an insert also drops expired entries.
pub const SWEEP_EVERY: usize = 256;

struct Entry {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Type-safe in-process cache.
///
/// Values are stored as JSON so any `Serialize + DeserializeOwned` type can
/// go in. Cloning is cheap; clones share the same entries.
///
/// Expired entries are dropped when read, on every [`SWEEP_EVERY`]th write,
/// and by [`Cache::purge_expired`].
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    writes: Arc<AtomicUsize>,
    default_ttl: Option<Duration>,
}

impl Cache {
    /// Create an empty cache whose entries never expire by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `ttl` to every plain [`Cache::set`].
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => {
                Ok(Some(serde_json::from_slice(&entry.bytes)?))
            }
            _ => Ok(None),
        }
    }

    /// Get a value, failing with [`CacheError::NotFound`] when absent.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get(key)?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    /// Set a value using the default TTL.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.insert(key, value, self.default_ttl)
    }

    /// Set a value that expires after `ttl`.
    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.insert(key, value, Some(ttl))
    }

    fn insert<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        let now = Instant::now();
        let expires_at = ttl.map(|ttl| now + ttl);
        let sweep = (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if sweep {
            let before = entries.len();
            entries.retain(|_, e| e.is_live(now));
            debug!(removed = before - entries.len(), "swept expired cache entries");
        }
        entries.insert(key.to_string(), Entry { bytes, expires_at });
        Ok(())
    }

    /// Read-modify-write a value under one lock.
    ///
    /// The entry keeps its expiry. Fails with [`CacheError::NotFound`] when
    /// the key is absent.
    pub fn update<T, F>(&self, key: &str, f: F) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .get_mut(key)
            .filter(|e| e.is_live(Instant::now()))
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        let mut value: T = serde_json::from_slice(&entry.bytes)?;
        f(&mut value);
        entry.bytes = serde_json::to_vec(&value)?;
        Ok(value)
    }

    /// Push the expiry of an existing entry `ttl` into the future.
    pub fn touch(&self, key: &str, ttl: Duration) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
                true
            }
            _ => false,
        }
    }

    /// Delete a value. Returns whether a live entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some_and(|e| e.is_live(Instant::now()))
    }

    /// Check if a live key exists.
    pub fn exists(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|e| e.is_live(Instant::now()))
    }

    /// Live keys starting with `prefix`, sorted.
    pub fn keys(&self, prefix: &str) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of stored entries, expired ones included.
    pub fn stored(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        removed
    }
}

/// Helper to build cache keys with namespacing.
///
/// ```rust
/// use duka_cache::cache_key;
///
/// let key = cache_key!("session", "sess_abc");
/// assert_eq!(key, "session:sess_abc");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
