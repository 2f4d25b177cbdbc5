//! Bounded, time-expiring memo of successful responses.
//!
//! Each [`RequestClient`](crate::client::RequestClient) owns its own cache.
//! Entries are keyed by endpoint and normalized parameters.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use marketprobe_core::Params;
use serde_json::Value;

/// Default number of cached responses.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default time-to-live of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    endpoint: String,
    params: String,
}

impl CacheKey {
    fn new(endpoint: &str, params: &Params) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            params: params.cache_key(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

/// Response cache with a fixed capacity and per-entry TTL.
///
/// A capacity of zero disables caching.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, CacheEntry>,
    capacity: usize,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates a cache.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            ttl,
        }
    }

    /// Creates a cache that stores nothing.
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Returns true if the cache can hold entries.
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0 && !self.ttl.is_zero()
    }

    /// Returns a fresh cached value.
    pub fn get(&mut self, endpoint: &str, params: &Params) -> Option<Value> {
        self.get_at(endpoint, params, Instant::now())
    }

    /// Returns a cached value that is still fresh at `now`.
    pub fn get_at(&mut self, endpoint: &str, params: &Params, now: Instant) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let key = CacheKey::new(endpoint, params);
        let entry = self.entries.get(&key)?;
        if now.saturating_duration_since(entry.inserted_at) >= self.ttl {
            self.entries.remove(&key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Stores a value.
    pub fn insert(&mut self, endpoint: &str, params: &Params, value: Value) {
        self.insert_at(endpoint, params, value, Instant::now());
    }

    /// Stores a value as inserted at `now`.
    pub fn insert_at(&mut self, endpoint: &str, params: &Params, value: Value, now: Instant) {
        if !self.is_enabled() {
            return;
        }

        let key = CacheKey::new(endpoint, params);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired(now);
            if self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Number of stored entries (fresh or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}
