//! Local in-memory cache with loader-based population
//!
//! Process-wide key/value cache of string payloads with per-key TTL,
//! background reclamation of expired entries, single-flight deduplication of
//! concurrent loads and best-effort refresh-ahead.
//!
//! Handlers read through [`LocalCache::get_with_auto_refresh`] keyed by a
//! logical resource name (`"channels"`, `"tags"`) and call
//! [`LocalCache::delete`] on that key whenever the underlying data is mutated.

mod singleflight;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::errors::AppResult;
use crate::logger::{self, LogTag};
use singleflight::FlightGroup;

/// A cached value with its expiration deadline
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Shared in-memory cache handle
///
/// Cheap to clone; all clones operate on the same store. Safe for concurrent
/// use from any number of tasks without external locking.
#[derive(Debug, Clone)]
pub struct LocalCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    group: Arc<FlightGroup>,
}

impl LocalCache {
    /// Create a cache and start its background reclamation task.
    ///
    /// Must be called from within a tokio runtime. The reclamation task runs
    /// for the lifetime of the process; expired entries it misses are evicted
    /// lazily by [`LocalCache::get`].
    pub fn new(gc_interval: Duration) -> Self {
        let cache = Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            group: Arc::new(FlightGroup::default()),
        };
        cache.spawn_gc(gc_interval);
        cache
    }

    /// Look up a non-expired entry, returning its value and deadline.
    ///
    /// An expired entry is removed on the spot and reported as absent.
    pub fn get(&self, key: &str) -> Option<(String, Instant)> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                Some((entry.value.clone(), entry.expires_at))
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry with `expires_at = now + ttl`.
    pub fn set(&self, key: &str, value: String, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
    }

    /// Remove an entry unconditionally (no-op when absent).
    pub fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Current number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read through the cache, populating it on miss.
    ///
    /// A hit returns immediately without invoking the loader. On miss, all
    /// concurrent callers for the same key share a single loader invocation;
    /// its success is stored with `ttl` before returning, its error is
    /// surfaced to every waiter and never cached.
    pub async fn get_with_loader<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<String>> + Send + 'static,
    {
        if let Some((value, _)) = self.get(key) {
            logger::debug(LogTag::Cache, &format!("serving {} from local cache", key));
            return Ok(value);
        }
        let value = self.group.run(key, loader).await?;
        // Every coalesced caller stores the shared result; the writes are
        // idempotent, last writer wins.
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Read through the cache without ever blocking on a refresh.
    ///
    /// A hit returns immediately. When less than a tenth of `ttl` remains,
    /// the loader additionally runs in a detached task whose success
    /// re-populates the entry with a fresh `ttl` window and whose failure is
    /// discarded. The refresh is deliberately not routed through the flight
    /// group: concurrent near-expiry readers may each fire a redundant
    /// refresh, and the idempotent store keeps that harmless. A miss behaves
    /// exactly like [`LocalCache::get_with_loader`].
    pub async fn get_with_auto_refresh<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> AppResult<String>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<String>> + Send + 'static,
    {
        if let Some((value, expires_at)) = self.get(key) {
            if expires_at.saturating_duration_since(Instant::now()) < ttl / 10 {
                let cache = self.clone();
                let key = key.to_string();
                tokio::spawn(async move {
                    match loader().await {
                        Ok(data) => cache.set(&key, data, ttl),
                        // The caller already got a valid value; nothing owes
                        // this failure a response.
                        Err(_) => {}
                    }
                });
            }
            logger::debug(LogTag::Cache, &format!("serving {} from local cache", key));
            return Ok(value);
        }
        self.get_with_loader(key, ttl, loader).await
    }

    fn spawn_gc(&self, interval: Duration) {
        let entries = Arc::clone(&self.entries);
        tokio::spawn(async move {
            loop {
                time::sleep(interval).await;
                let now = Instant::now();
                entries.lock().unwrap().retain(|_, entry| now < entry.expires_at);
            }
        });
    }
}
