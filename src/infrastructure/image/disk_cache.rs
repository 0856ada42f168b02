//! Disk-based cache store for persistence across sessions.
//!
//! Each entry is a `<id>.img` payload plus a `<id>.json` metadata sidecar, both
//! replaced atomically on store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::domain::entities::{CachedEntry, ResourceKey, ResponseMetadata};
use crate::domain::ports::CacheStorePort;

/// Maximum disk cache size in bytes (200 MB default).
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 200 * 1024 * 1024;

const PAYLOAD_EXT: &str = "img";
const METADATA_EXT: &str = "json";

/// Disk cache errors.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DiskCacheError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Disk-based cache store that persists raw payloads and their metadata.
pub struct DiskCacheStore {
    cache_dir: PathBuf,
    max_size: u64,
    current_size: AtomicU64,
    item_count: AtomicUsize,
    write_lock: Mutex<()>,
}

impl DiskCacheStore {
    /// Opens a disk cache in the specified directory, creating it if needed.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be created or read.
    pub fn new(cache_dir: PathBuf, max_size: u64) -> Result<Self, DiskCacheError> {
        fs::create_dir_all(&cache_dir)?;

        let mut total_size = 0u64;
        let mut count = 0usize;
        for entry in fs::read_dir(&cache_dir)?.flatten() {
            let path = entry.path();
            if has_extension(&path, PAYLOAD_EXT)
                && let Ok(meta) = entry.metadata()
            {
                total_size += meta.len();
                count += 1;
            }
        }

        let cache = Self {
            cache_dir,
            max_size,
            current_size: AtomicU64::new(total_size),
            item_count: AtomicUsize::new(count),
            write_lock: Mutex::new(()),
        };

        cache.cleanup_if_needed();

        Ok(cache)
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the current payload size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Checks if a payload is cached for `key`, fresh or not.
    #[must_use]
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.payload_path(&key.cache_id()).exists()
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.cache_dir.join(format!("{id}.{PAYLOAD_EXT}"))
    }

    fn metadata_path(&self, id: &str) -> PathBuf {
        self.cache_dir.join(format!("{id}.{METADATA_EXT}"))
    }

    fn read_entry(&self, id: &str) -> Option<CachedEntry> {
        let raw = fs::read(self.metadata_path(id)).ok()?;
        let metadata: ResponseMetadata = match serde_json::from_slice(&raw) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(id = id, error = %e, "Unreadable cache metadata");
                return None;
            }
        };
        let bytes = fs::read(self.payload_path(id)).ok()?;
        Some(CachedEntry::new(bytes, metadata))
    }

    fn write_entry(&self, id: &str, entry: &CachedEntry) -> Result<(), DiskCacheError> {
        let _guard = self.write_lock.lock();
        let payload_path = self.payload_path(id);
        let old_size = fs::metadata(&payload_path).map(|m| m.len()).ok();

        write_atomic(&payload_path, entry.bytes())?;
        write_atomic(&self.metadata_path(id), &serde_json::to_vec(entry.metadata())?)?;

        let new_size = entry.len() as u64;
        if let Some(old) = old_size {
            if new_size > old {
                self.current_size
                    .fetch_add(new_size - old, Ordering::Relaxed);
            } else {
                self.current_size
                    .fetch_sub(old - new_size, Ordering::Relaxed);
            }
        } else {
            self.current_size.fetch_add(new_size, Ordering::Relaxed);
            self.item_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn remove_entry(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock();
        let payload_path = self.payload_path(id);
        let size = fs::metadata(&payload_path).map(|m| m.len()).ok();

        if let Err(e) = fs::remove_file(self.metadata_path(id))
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(id = id, error = %e, "Failed to remove cache metadata");
        }

        match fs::remove_file(&payload_path) {
            Ok(()) => {
                if let Some(s) = size {
                    self.current_size.fetch_sub(s, Ordering::Relaxed);
                    self.item_count.fetch_sub(1, Ordering::Relaxed);
                }
                true
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(id = id, error = %e, "Failed to remove cache payload");
                }
                false
            }
        }
    }

    /// Removes least recently accessed entries until the cache is 10% below its limit.
    fn cleanup_if_needed(&self) {
        let current_size = self.current_size();
        if current_size <= self.max_size {
            return;
        }

        debug!(
            current_size = current_size,
            max_size = self.max_size,
            "Disk cache over limit, cleaning up"
        );

        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return;
        };

        let mut files: Vec<(String, std::time::SystemTime)> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if !has_extension(&path, PAYLOAD_EXT) {
                    return None;
                }
                let id = path.file_stem()?.to_str()?.to_string();
                let meta = entry.metadata().ok()?;
                let accessed = meta
                    .accessed()
                    .or_else(|_| meta.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                Some((id, accessed))
            })
            .collect();

        files.sort_by_key(|(_, time)| *time);

        let target = current_size - self.max_size + (self.max_size / 10);
        let mut freed_count = 0usize;

        for (id, _) in files {
            if current_size.saturating_sub(self.current_size()) >= target {
                break;
            }
            if self.remove_entry(&id) {
                trace!(id = %id, "Removed old cache entry");
                freed_count += 1;
            }
        }

        debug!(
            freed_size = current_size.saturating_sub(self.current_size()),
            freed_count = freed_count,
            "Disk cache cleanup complete"
        );
    }
}

impl CacheStorePort for DiskCacheStore {
    fn lookup(&self, key: &ResourceKey) -> Option<CachedEntry> {
        let id = key.cache_id();
        let Some(entry) = self.read_entry(&id) else {
            trace!(key = %key, "Disk cache miss");
            return None;
        };

        if !entry.is_fresh(Utc::now()) {
            debug!(key = %key, "Evicting stale entry from disk cache");
            self.remove_entry(&id);
            return None;
        }

        trace!(key = %key, "Disk cache hit");
        Some(entry)
    }

    fn store(&self, key: ResourceKey, entry: CachedEntry) {
        let id = key.cache_id();
        match self.write_entry(&id, &entry) {
            Ok(()) => {
                debug!(key = %key, size = entry.len(), "Stored entry in disk cache");
                self.cleanup_if_needed();
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to write disk cache entry"),
        }
    }

    fn evict(&self, key: &ResourceKey) {
        if self.remove_entry(&key.cache_id()) {
            debug!(key = %key, "Evicted entry from disk cache");
        }
    }

    fn clear(&self) {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            warn!(path = %self.cache_dir.display(), "Failed to read cache dir");
            return;
        };

        let _guard = self.write_lock.lock();
        for entry in entries.flatten() {
            let path = entry.path();
            if (has_extension(&path, PAYLOAD_EXT) || has_extension(&path, METADATA_EXT))
                && fs::remove_file(&path).is_err()
            {
                warn!(path = %path.display(), "Failed to remove cache file");
            }
        }
        self.current_size.store(0, Ordering::Relaxed);
        self.item_count.store(0, Ordering::Relaxed);
        debug!("Cleared disk cache");
    }

    fn len(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), DiskCacheError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("Invalid cache path"))?;
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(data)?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Returns the default cache directory path.
#[must_use]
pub fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from(
        crate::APP_QUALIFIER,
        crate::APP_ORGANIZATION,
        crate::NAME,
    )
    .map(|dirs| dirs.cache_dir().join("images"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tempfile::TempDir;

    fn create_test_cache() -> (DiskCacheStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskCacheStore::new(temp_dir.path().to_path_buf(), 1024 * 1024).unwrap();
        (cache, temp_dir)
    }

    fn entry(data: &'static [u8]) -> CachedEntry {
        CachedEntry::new(data, ResponseMetadata::new(200).with_content_type("image/png"))
    }

    #[test]
    fn test_store_and_lookup() {
        let (cache, _temp) = create_test_cache();
        let key = ResourceKey::new("img://a");

        cache.store(key.clone(), entry(b"test image data"));
        let found = cache.lookup(&key).unwrap();

        assert_eq!(found.bytes().as_ref(), b"test image data");
        assert_eq!(found.metadata().content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _temp) = create_test_cache();
        assert!(cache.lookup(&ResourceKey::new("img://missing")).is_none());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let key = ResourceKey::new("img://a");
        {
            let cache = DiskCacheStore::new(temp_dir.path().to_path_buf(), 1024).unwrap();
            cache.store(key.clone(), entry(b"persisted"));
        }

        let reopened = DiskCacheStore::new(temp_dir.path().to_path_buf(), 1024).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.current_size(), 9);
        assert_eq!(reopened.lookup(&key).unwrap().bytes().as_ref(), b"persisted");
    }

    #[test]
    fn test_missing_metadata_is_a_miss() {
        let (cache, _temp) = create_test_cache();
        let key = ResourceKey::new("img://a");
        cache.store(key.clone(), entry(b"data"));

        fs::remove_file(cache.metadata_path(&key.cache_id())).unwrap();

        assert!(cache.lookup(&key).is_none());
        assert!(cache.contains(&key));
    }

    #[test]
    fn test_corrupt_metadata_is_a_miss() {
        let (cache, _temp) = create_test_cache();
        let key = ResourceKey::new("img://a");
        cache.store(key.clone(), entry(b"data"));

        fs::write(cache.metadata_path(&key.cache_id()), b"{not json").unwrap();

        assert!(cache.lookup(&key).is_none());
    }

    #[test]
    fn test_stale_entry_is_evicted() {
        let (cache, _temp) = create_test_cache();
        let key = ResourceKey::new("img://a");
        let metadata = ResponseMetadata::new(200)
            .with_fetched_at(Utc::now() - TimeDelta::hours(2))
            .with_max_age(60);
        cache.store(key.clone(), CachedEntry::new(&b"old"[..], metadata));

        assert!(cache.lookup(&key).is_none());
        assert!(!cache.contains(&key));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evict() {
        let (cache, _temp) = create_test_cache();
        let key = ResourceKey::new("img://a");

        cache.store(key.clone(), entry(b"test"));
        assert!(cache.contains(&key));

        cache.evict(&key);
        assert!(!cache.contains(&key));
    }

    #[test]
    fn test_clear() {
        let (cache, temp) = create_test_cache();

        cache.store(ResourceKey::new("img://a"), entry(b"data1"));
        cache.store(ResourceKey::new("img://b"), entry(b"data2"));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_atomic_counters_sync() {
        let (cache, _temp) = create_test_cache();
        let a = ResourceKey::new("img://a");
        let b = ResourceKey::new("img://b");

        assert_eq!(cache.current_size(), 0);
        assert_eq!(cache.len(), 0);

        cache.store(a.clone(), entry(b"hello"));
        cache.store(b.clone(), entry(b"world!"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 11);

        cache.store(a, entry(b"hey"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 9);

        cache.evict(&b);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 3);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.current_size(), 0);
    }

    #[test]
    fn test_cleanup_updates_counters() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskCacheStore::new(temp_dir.path().to_path_buf(), 10).unwrap();

        cache.store(ResourceKey::new("img://a"), entry(b"123456"));
        std::thread::sleep(std::time::Duration::from_millis(10));
        cache.store(ResourceKey::new("img://b"), entry(b"123456"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 6);
    }
}
