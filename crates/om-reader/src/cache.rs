//! In-memory LRU cache for fetched byte ranges.

use std::num::NonZeroUsize;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::Mutex;

/// Cache key for ranges: (offset, size).
pub type RangeKey = (u64, u64);

/// Cache statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RangeCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_bytes_cached: u64,
}

impl RangeCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Inner {
    entries: LruCache<RangeKey, Bytes>,
    stats: RangeCacheStats,
}

/// LRU cache of byte ranges keyed by (offset, size).
pub struct RangeCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl RangeCache {
    /// Create a cache holding at most `capacity` ranges (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let size = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(size),
                stats: RangeCacheStats::default(),
            }),
            capacity: size.get(),
        }
    }

    /// Look up a range, recording a hit or miss.
    pub async fn get(&self, key: &RangeKey) -> Option<Bytes> {
        let mut inner = self.inner.lock().await;
        match inner.entries.get(key).cloned() {
            Some(data) => {
                inner.stats.hits += 1;
                Some(data)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Insert a range, evicting the least recently used entry when full.
    pub async fn insert(&self, key: RangeKey, data: Bytes) {
        let mut inner = self.inner.lock().await;
        let size = data.len() as u64;
        // push also returns the old value when the key was already present
        if let Some((old_key, evicted)) = inner.entries.push(key, data) {
            if old_key != key {
                inner.stats.evictions += 1;
            }
            inner.stats.total_bytes_cached =
                inner.stats.total_bytes_cached.saturating_sub(evicted.len() as u64);
        }
        inner.stats.total_bytes_cached += size;
    }

    pub async fn stats(&self) -> RangeCacheStats {
        self.inner.lock().await.stats.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Drop all entries and reset statistics.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.stats = RangeCacheStats::default();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
