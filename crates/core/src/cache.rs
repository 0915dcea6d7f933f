//! In-memory query cache for aggregated product sets.
//!
//! Entries are keyed by the trimmed query text and hold the set produced by
//! aggregation plus keyword inclusion, before any site or ban filter. The
//! cache is bounded by a number of distinct keys; inserting a new key at
//! capacity evicts the entry with the oldest insertion time. Reads never
//! refresh an entry's age.
//!
//! Cold lookups go through [`QueryCache::get_or_fetch`], which serializes
//! fetches per key so concurrent requests for the same cold query fan out
//! once and the later callers read the stored result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::product::Product;

/// Default maximum number of distinct cached queries.
pub const DEFAULT_CAPACITY: usize = 30;

/// Cached aggregation result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// When the entry was (re)inserted.
    pub inserted_at: DateTime<Utc>,
    /// Aggregated, inclusion-filtered products.
    pub data: Arc<Vec<Product>>,
    seq: u64,
}

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Refreshed,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    next_seq: u64,
}

/// Bounded query cache with insertion-time eviction.
#[derive(Debug)]
pub struct QueryCache {
    capacity: usize,
    entries: Mutex<Entries>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` distinct queries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Maximum number of distinct keys.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached queries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    /// Whether the cache holds no queries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.map.is_empty()
    }

    /// Whether `query` is currently cached.
    pub async fn contains(&self, query: &str) -> bool {
        self.entries.lock().await.map.contains_key(query)
    }

    /// Cached data for `query`, if present.
    pub async fn get(&self, query: &str) -> Option<Arc<Vec<Product>>> {
        self.entries.lock().await.map.get(query).map(|e| e.data.clone())
    }

    /// Full entry for `query`, including its insertion time.
    pub async fn entry(&self, query: &str) -> Option<CacheEntry> {
        self.entries.lock().await.map.get(query).cloned()
    }

    /// Insert or replace the entry for `query`.
    ///
    /// Replacing an existing key resets its insertion time and never
    /// evicts. Inserting a new key at capacity evicts the oldest entry.
    pub async fn put(&self, query: &str, items: Vec<Product>) -> Arc<Vec<Product>> {
        let data = Arc::new(items);
        let mut entries = self.entries.lock().await;

        if !entries.map.contains_key(query) && entries.map.len() >= self.capacity {
            let oldest = entries
                .map
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone());
            if let Some(key) = oldest {
                entries.map.remove(&key);
                tracing::debug!(evicted = %key, capacity = self.capacity, "evicted oldest cached query");
            }
        }

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries
            .map
            .insert(query.to_string(), CacheEntry { inserted_at: Utc::now(), data: data.clone(), seq });

        data
    }

    /// Serve `query` from the cache, or run `fetch` and store its result.
    ///
    /// With `refresh` set the cached value is ignored and overwritten.
    /// Fetches for the same key never overlap.
    pub async fn get_or_fetch<F, Fut>(&self, query: &str, refresh: bool, fetch: F) -> (Arc<Vec<Product>>, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Product>>,
    {
        if !refresh && let Some(hit) = self.get(query).await {
            tracing::debug!(query, "query cache hit");
            return (hit, CacheStatus::Hit);
        }

        let key_lock = self.key_lock(query).await;
        let guard = key_lock.lock().await;

        // Another caller may have filled the key while we waited.
        if !refresh && let Some(hit) = self.get(query).await {
            drop(guard);
            self.release_key_lock(query, key_lock).await;
            tracing::debug!(query, "query cache hit after wait");
            return (hit, CacheStatus::Hit);
        }

        tracing::debug!(query, refresh, "query cache miss");
        let items = fetch().await;
        let data = self.put(query, items).await;

        drop(guard);
        self.release_key_lock(query, key_lock).await;

        let status = if refresh { CacheStatus::Refreshed } else { CacheStatus::Miss };
        (data, status)
    }

    async fn key_lock(&self, query: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight.entry(query.to_string()).or_default().clone()
    }

    async fn release_key_lock(&self, query: &str, key_lock: Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // Map + this handle; anyone else still holding a clone is waiting on it.
        if Arc::strong_count(&key_lock) <= 2 {
            inflight.remove(query);
        }
    }
}
