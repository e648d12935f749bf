//! In-memory cache with optional per-entry expiry
//!
//! Provides a `TtlCache` that maps keys to values stamped with the time they
//! were cached. Expiry is checked when an entry is read and expired entries are
//! evicted lazily; there is no background sweep.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

/// Wrapper struct for a cached value
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    data: V,
    /// When the value was cached
    cached_at: DateTime<Utc>,
    /// When the entry expires, `None` for entries that live as long as the cache
    expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// Result of reading from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData<V> {
    /// The cached value
    pub data: V,
    /// When the value was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Key/value store where every entry carries its insertion time
///
/// Entries written with a TTL stop being returned once the TTL has elapsed and
/// are dropped on the read that notices it. Entries written without a TTL are
/// kept until `remove` or `clear`.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// TTL applied by `insert`
    default_ttl: Option<Duration>,
}

impl<K: Eq + Hash, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Creates a cache whose entries never expire
    pub fn unbounded() -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl: None,
        }
    }

    /// Creates a cache whose entries expire `ttl` after insertion
    pub fn with_ttl(ttl: std::time::Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl: to_chrono(ttl),
        }
    }

    /// Returns the TTL applied by `insert`, if any
    pub fn default_ttl(&self) -> Option<std::time::Duration> {
        self.default_ttl.and_then(|ttl| ttl.to_std().ok())
    }

    /// Reads a live entry, evicting it if it has expired
    pub fn get(&mut self, key: &K) -> Option<CachedData<V>> {
        self.get_at(key, Utc::now())
    }

    /// Reads a live entry as seen at `now`
    pub fn get_at(&mut self, key: &K, now: DateTime<Utc>) -> Option<CachedData<V>> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| CachedData {
            data: entry.data.clone(),
            cached_at: entry.cached_at,
        })
    }

    /// Stores a value using the cache's default TTL
    pub fn insert(&mut self, key: K, data: V) {
        let ttl = self.default_ttl;
        self.insert_entry(key, data, Utc::now(), ttl);
    }

    /// Stores a value with an explicit TTL, overriding the default
    pub fn insert_with_ttl(&mut self, key: K, data: V, ttl: std::time::Duration) {
        self.insert_entry(key, data, Utc::now(), to_chrono(ttl));
    }

    /// Stores a value as if it had been cached at `now`
    pub fn insert_at(&mut self, key: K, data: V, now: DateTime<Utc>) {
        let ttl = self.default_ttl;
        self.insert_entry(key, data, now, ttl);
    }

    fn insert_entry(&mut self, key: K, data: V, now: DateTime<Utc>, ttl: Option<Duration>) {
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add_signed(ttl)),
        };
        self.entries.insert(key, entry);
    }

    /// Removes a single entry, returning whether it was present
    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Converts a std duration into chrono; durations too large to represent never expire
fn to_chrono(ttl: std::time::Duration) -> Option<Duration> {
    Duration::from_std(ttl).ok()
}
