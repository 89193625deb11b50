//! In-memory response cache with per-entry TTL.
//!
//! Concurrent misses on the same key are not coalesced: each caller fetches
//! upstream and the last `set` wins. Upstream data is read-only per key, so
//! both writes carry the same body.

use crate::models::responses::CacheStats;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for a request: method plus path and raw query string.
    pub fn request_key(method: &str, path_and_query: &str) -> String {
        format!("{} {}", method, path_and_query)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_valid(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache HIT: {}", key);
                return Some(entry.value.clone());
            }
            drop(entry);
            self.entries.remove_if(key, |_, entry| !entry.is_valid(now));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache MISS: {}", key);
        None
    }

    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
    }

    /// Drops every entry and returns how many were removed.
    pub fn flush(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        debug!("Cache flushed ({} entries)", count);
        count
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            keys: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Removes expired entries and returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid(now));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!("Evicted {} expired cache entries", evicted);
        }
        evicted
    }
}
