//! In-process cache with TTL and stale reads

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub ttl: Option<Duration>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl: Option<Duration>) -> Self {
        Self {
            data,
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Fresh while less than `ttl` has elapsed since the entry was written
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.ttl {
            Some(ttl) => now - self.created_at < ttl,
            None => true,
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

/// Per-entry line of [`CacheStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryStats {
    pub key: String,
    pub age_ms: i64,
    /// `None` for entries that never expire
    pub ttl_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<CacheEntryStats>,
}

/// In-memory cache with TTL support.
///
/// Expired entries are kept until overwritten or evicted so that callers
/// can fall back to them with [`MemoryCache::get_stale`] when a refresh fails.
/// With a capacity set, inserting a new key into a full cache evicts the
/// oldest expired entry, or the oldest entry when none has expired.
#[derive(Debug)]
pub struct MemoryCache<T> {
    storage: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    default_ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl<T> Clone for MemoryCache<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            default_ttl: self.default_ttl,
            max_entries: self.max_entries,
        }
    }
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
            max_entries: None,
        }
    }

    /// Bound the number of keys; zero is treated as one
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Get a value that is still within its TTL
    pub async fn get(&self, key: &str) -> Option<T> {
        let storage = self.storage.read().await;
        let now = Utc::now();
        storage
            .get(key)
            .filter(|entry| entry.is_fresh_at(now))
            .map(|entry| entry.data.clone())
    }

    /// Get a value regardless of age
    pub async fn get_stale(&self, key: &str) -> Option<T> {
        let storage = self.storage.read().await;
        storage.get(key).map(|entry| entry.data.clone())
    }

    /// Set value in cache with optional TTL
    pub async fn set(&self, key: String, value: T, ttl: Option<Duration>) {
        let mut storage = self.storage.write().await;
        if let Some(max) = self.max_entries {
            if !storage.contains_key(&key) && storage.len() >= max {
                if let Some(victim) = eviction_candidate(&storage, Utc::now()) {
                    storage.remove(&victim);
                }
            }
        }
        let entry = CacheEntry::new(value, ttl.or(self.default_ttl));
        storage.insert(key, entry);
    }

    /// Remove value from cache
    pub async fn remove(&self, key: &str) -> bool {
        let mut storage = self.storage.write().await;
        storage.remove(key).is_some()
    }

    /// Get cache size
    pub async fn size(&self) -> usize {
        let storage = self.storage.read().await;
        storage.len()
    }

    /// Clear all entries
    pub async fn clear(&self) {
        let mut storage = self.storage.write().await;
        storage.clear();
    }

    /// Snapshot of keys with their age and TTL, sorted by key
    pub async fn stats(&self) -> CacheStats {
        let storage = self.storage.read().await;
        let mut entries: Vec<CacheEntryStats> = storage
            .iter()
            .map(|(key, entry)| CacheEntryStats {
                key: key.clone(),
                age_ms: entry.age().num_milliseconds().max(0),
                ttl_ms: entry.ttl.map(|ttl| ttl.num_milliseconds()),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: entries.len(),
            entries,
        }
    }
}

/// Oldest expired key, else the oldest key overall
fn eviction_candidate<T>(
    storage: &HashMap<String, CacheEntry<T>>,
    now: DateTime<Utc>,
) -> Option<String> {
    storage
        .iter()
        .min_by_key(|(_, entry)| (entry.is_fresh_at(now), entry.created_at))
        .map(|(key, _)| key.clone())
}
