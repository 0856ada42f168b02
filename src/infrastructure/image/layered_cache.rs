//! Process-wide cache store: memory in front of an optional disk tier.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::entities::{CachedEntry, ResourceKey};
use crate::domain::ports::CacheStorePort;

use super::disk_cache::DiskCacheStore;
use super::memory_cache::{CacheStats, MemoryCacheStore};

/// Two-tier cache store. Lookups try memory, then disk, promoting disk hits;
/// stores write through to both tiers.
pub struct LayeredCacheStore {
    memory: Arc<MemoryCacheStore>,
    disk: Option<Arc<DiskCacheStore>>,
}

impl LayeredCacheStore {
    /// Creates a layered store.
    #[must_use]
    pub const fn new(memory: Arc<MemoryCacheStore>, disk: Option<Arc<DiskCacheStore>>) -> Self {
        Self { memory, disk }
    }

    /// Creates a memory-only store.
    #[must_use]
    pub const fn memory_only(memory: Arc<MemoryCacheStore>) -> Self {
        Self::new(memory, None)
    }

    /// Returns memory tier statistics.
    #[must_use]
    pub fn memory_stats(&self) -> CacheStats {
        self.memory.stats()
    }

    /// Returns the disk tier, if enabled.
    #[must_use]
    pub fn disk(&self) -> Option<&Arc<DiskCacheStore>> {
        self.disk.as_ref()
    }
}

impl CacheStorePort for LayeredCacheStore {
    fn lookup(&self, key: &ResourceKey) -> Option<CachedEntry> {
        if let Some(entry) = self.memory.lookup(key) {
            return Some(entry);
        }

        let entry = self.disk.as_ref()?.lookup(key)?;
        trace!(key = %key, "Promoting disk entry to memory");
        self.memory.store(key.clone(), entry.clone());
        Some(entry)
    }

    fn store(&self, key: ResourceKey, entry: CachedEntry) {
        if let Some(disk) = &self.disk {
            disk.store(key.clone(), entry.clone());
        }
        self.memory.store(key, entry);
    }

    fn evict(&self, key: &ResourceKey) {
        self.memory.evict(key);
        if let Some(disk) = &self.disk {
            disk.evict(key);
        }
    }

    fn clear(&self) {
        self.memory.clear();
        if let Some(disk) = &self.disk {
            disk.clear();
        }
        debug!("Cleared all cache tiers");
    }

    fn len(&self) -> usize {
        self.disk
            .as_ref()
            .map_or_else(|| self.memory.len(), |disk| disk.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ResponseMetadata;
    use tempfile::TempDir;

    fn layered() -> (LayeredCacheStore, Arc<MemoryCacheStore>, Arc<DiskCacheStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let memory = Arc::new(MemoryCacheStore::new(10));
        let disk =
            Arc::new(DiskCacheStore::new(temp_dir.path().to_path_buf(), 1024 * 1024).unwrap());
        let store = LayeredCacheStore::new(memory.clone(), Some(disk.clone()));
        (store, memory, disk, temp_dir)
    }

    fn entry(data: &'static [u8]) -> CachedEntry {
        CachedEntry::new(data, ResponseMetadata::new(200))
    }

    #[test]
    fn test_store_writes_both_tiers() {
        let (store, memory, disk, _temp) = layered();
        let key = ResourceKey::new("img://a");

        store.store(key.clone(), entry(b"payload"));

        assert!(memory.peek(&key).is_some());
        assert!(disk.contains(&key));
    }

    #[test]
    fn test_disk_hit_is_promoted() {
        let (store, memory, disk, _temp) = layered();
        let key = ResourceKey::new("img://a");
        disk.store(key.clone(), entry(b"payload"));
        assert!(memory.peek(&key).is_none());

        let found = store.lookup(&key).unwrap();

        assert_eq!(found.bytes().as_ref(), b"payload");
        assert!(memory.peek(&key).is_some());
    }

    #[test]
    fn test_memory_only_miss() {
        let store = LayeredCacheStore::memory_only(Arc::new(MemoryCacheStore::new(4)));
        assert!(store.lookup(&ResourceKey::new("img://a")).is_none());
        assert!(store.disk().is_none());
    }

    #[test]
    fn test_clear_and_evict_reach_both_tiers() {
        let (store, memory, disk, _temp) = layered();
        let a = ResourceKey::new("img://a");
        let b = ResourceKey::new("img://b");
        store.store(a.clone(), entry(b"a"));
        store.store(b.clone(), entry(b"b"));

        store.evict(&a);
        assert!(memory.peek(&a).is_none());
        assert!(!disk.contains(&a));
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(memory.is_empty());
        assert!(disk.is_empty());
    }
}
