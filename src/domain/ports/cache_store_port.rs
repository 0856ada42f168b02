//! Port definition for the response cache.

use crate::domain::entities::{CachedEntry, ResourceKey};

/// Key-value store of cached responses.
///
/// Implementations are shared process-wide and must be safe for concurrent
/// access from independent coordinators. Operations never touch the network.
#[cfg_attr(test, mockall::automock)]
pub trait CacheStorePort: Send + Sync {
    /// Returns the entry for `key` if present and still fresh.
    /// Absence is a normal outcome, not a failure.
    fn lookup(&self, key: &ResourceKey) -> Option<CachedEntry>;

    /// Inserts or replaces the entry for `key`. Last writer wins.
    fn store(&self, key: ResourceKey, entry: CachedEntry);

    /// Removes the entry for `key`, if any.
    fn evict(&self, key: &ResourceKey);

    /// Removes every entry.
    fn clear(&self);

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns true if the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
