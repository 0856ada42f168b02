//! In-memory LRU cache store.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{CachedEntry, ResourceKey};
use crate::domain::ports::CacheStorePort;

/// Default maximum number of entries kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// In-memory LRU cache of response payloads.
pub struct MemoryCacheStore {
    cache: Mutex<LruCache<ResourceKey, CachedEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCacheStore {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }

    /// Peeks at an entry without promoting it in the LRU or counting a hit.
    #[must_use]
    pub fn peek(&self, key: &ResourceKey) -> Option<CachedEntry> {
        self.cache.lock().peek(key).cloned()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached entries.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} entries, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

impl CacheStorePort for MemoryCacheStore {
    fn lookup(&self, key: &ResourceKey) -> Option<CachedEntry> {
        let mut cache = self.cache.lock();
        let found = match cache.get(key) {
            Some(entry) if entry.is_fresh(Utc::now()) => Some(entry.clone()),
            Some(_) => {
                debug!(key = %key, "Evicting stale entry from memory cache");
                cache.pop(key);
                None
            }
            None => None,
        };
        drop(cache);

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
        }
        found
    }

    fn store(&self, key: ResourceKey, entry: CachedEntry) {
        debug!(key = %key, size = entry.len(), "Storing entry in memory cache");
        self.cache.lock().put(key, entry);
    }

    fn evict(&self, key: &ResourceKey) {
        if self.cache.lock().pop(key).is_some() {
            debug!(key = %key, "Evicted entry from memory cache");
        }
    }

    fn clear(&self) {
        self.cache.lock().clear();
        debug!("Cleared memory cache");
    }

    fn len(&self) -> usize {
        self.cache.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ResponseMetadata;
    use chrono::TimeDelta;

    fn entry(data: &'static [u8]) -> CachedEntry {
        CachedEntry::new(data, ResponseMetadata::new(200))
    }

    #[test]
    fn test_store_and_lookup() {
        let cache = MemoryCacheStore::new(10);
        let key = ResourceKey::new("img://a");

        cache.store(key.clone(), entry(b"bytes"));
        let found = cache.lookup(&key);

        assert_eq!(found.unwrap().bytes().as_ref(), b"bytes");
    }

    #[test]
    fn test_lookup_miss() {
        let cache = MemoryCacheStore::new(10);
        assert!(cache.lookup(&ResourceKey::new("img://missing")).is_none());
    }

    #[test]
    fn test_store_replaces_entry() {
        let cache = MemoryCacheStore::new(10);
        let key = ResourceKey::new("img://a");

        cache.store(key.clone(), entry(b"first"));
        cache.store(key.clone(), entry(b"second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(&key).unwrap().bytes().as_ref(), b"second");
    }

    #[test]
    fn test_lru_eviction() {
        let cache = MemoryCacheStore::new(2);
        let a = ResourceKey::new("img://a");
        let b = ResourceKey::new("img://b");
        let c = ResourceKey::new("img://c");

        cache.store(a.clone(), entry(b"a"));
        cache.store(b.clone(), entry(b"b"));
        cache.store(c.clone(), entry(b"c"));

        // a should be evicted (LRU)
        assert!(cache.lookup(&a).is_none());
        assert!(cache.lookup(&b).is_some());
        assert!(cache.lookup(&c).is_some());
    }

    #[test]
    fn test_stale_entry_is_evicted_on_lookup() {
        let cache = MemoryCacheStore::new(10);
        let key = ResourceKey::new("img://a");
        let metadata = ResponseMetadata::new(200)
            .with_fetched_at(Utc::now() - TimeDelta::seconds(600))
            .with_max_age(60);

        cache.store(key.clone(), CachedEntry::new(&b"old"[..], metadata));

        assert!(cache.lookup(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let cache = MemoryCacheStore::new(10);
        let key = ResourceKey::new("img://a");
        cache.store(key.clone(), entry(b"a"));

        let _ = cache.lookup(&key);
        let _ = cache.lookup(&ResourceKey::new("img://missing"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!(stats.to_string().contains("50.0% hit rate"));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let cache = MemoryCacheStore::new(2);
        let a = ResourceKey::new("img://a");
        let b = ResourceKey::new("img://b");

        cache.store(a.clone(), entry(b"a"));
        cache.store(b, entry(b"b"));

        // Peek at a (should not promote it)
        assert!(cache.peek(&a).is_some());

        cache.store(ResourceKey::new("img://c"), entry(b"c"));
        assert!(cache.peek(&a).is_none());
    }

    #[test]
    fn test_evict_and_clear() {
        let cache = MemoryCacheStore::new(10);
        let a = ResourceKey::new("img://a");
        cache.store(a.clone(), entry(b"a"));
        cache.store(ResourceKey::new("img://b"), entry(b"b"));

        cache.evict(&a);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
