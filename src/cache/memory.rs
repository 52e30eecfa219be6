//! Memory Cache Module
//!
//! Expiring key-value map guarded by a mutex, with lazy TTL sweeping on reads.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::codec::Snapshot;
use crate::cache::{Cache, CacheItem, Lookup};
use crate::error::{CacheError, Result};

// == Memory Cache ==
/// In-memory cache with TTL support.
///
/// Every public operation holds the lock for its full duration, and reads hand
/// out clones so nothing references the map once the lock is released.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Key-value storage
    items: Mutex<HashMap<String, CacheItem>>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty MemoryCache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MemoryCache hydrated from a persisted representation.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let cache = Self::new();
        cache.unserialize(data)?;
        Ok(cache)
    }

    // == Keys ==
    /// Returns the live keys in sorted order, sweeping expired entries first.
    pub fn keys(&self) -> Vec<String> {
        let mut items = self.items.lock();
        sweep_expired(&mut items);

        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        keys
    }

    // == Length ==
    /// Returns the number of stored entries, including ones not yet swept.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl Cache for MemoryCache {
    // == Get ==
    fn get(&self, key: &str) -> Lookup {
        let mut items = self.items.lock();
        sweep_expired(&mut items);

        match items.get(key) {
            Some(item) => Lookup::hit(item.clone()),
            None => Lookup::miss(),
        }
    }

    // == Has ==
    fn has(&self, key: &str) -> bool {
        let mut items = self.items.lock();
        sweep_expired(&mut items);

        items.contains_key(key)
    }

    // == Delete ==
    fn delete(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }

    // == Save ==
    /// Items that are already expired are stored anyway; the next read
    /// sweeps them.
    fn save(&self, item: CacheItem) -> Result<()> {
        if item.key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        self.items.lock().insert(item.key.clone(), item);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    // == Serialize ==
    /// Encodes every stored entry as is; nothing is swept first.
    fn serialize(&self) -> Result<Vec<u8>> {
        let items = self.items.lock();
        Snapshot::encode(&items)
    }

    // == Unserialize ==
    /// Decoded entries replace the whole map. Expired ones are installed too
    /// and swept on the first read. On a decode error the map is unchanged.
    fn unserialize(&self, data: &[u8]) -> Result<()> {
        let decoded = Snapshot::decode(data)?;
        *self.items.lock() = decoded;
        Ok(())
    }
}

/// Removes every entry whose expiry lies strictly in the past.
///
/// Must be called with the lock held.
fn sweep_expired(items: &mut HashMap<String, CacheItem>) {
    let now = Utc::now();
    let before = items.len();

    items.retain(|_, item| !item.is_expired_at(now));

    let removed = before - items.len();
    if removed > 0 {
        debug!(removed, "swept expired cache items");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh(key: &str, value: &str) -> CacheItem {
        CacheItem::new(key, value).expires_in(Duration::hours(1))
    }

    fn stale(key: &str, value: &str) -> CacheItem {
        CacheItem::new(key, value).expires_in(Duration::hours(-1))
    }

    #[test]
    fn test_cache_new() {
        let cache = MemoryCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_never_saved() {
        let cache = MemoryCache::new();

        assert!(!cache.has("missing"));
        let lookup = cache.get("missing");
        assert!(!lookup.is_hit());
        assert_eq!(lookup.item(), &CacheItem::default());
    }

    #[test]
    fn test_save_and_get() {
        let cache = MemoryCache::new();

        cache.save(fresh("key1", "value1")).unwrap();
        let lookup = cache.get("key1");

        assert!(lookup.is_hit());
        assert_eq!(lookup.value(), "value1");
        assert_eq!(lookup.item().key, "key1");
        assert!(cache.has("key1"));
    }

    #[test]
    fn test_save_without_expiry() {
        let cache = MemoryCache::new();

        cache.save(CacheItem::new("forever", "value")).unwrap();

        assert!(cache.has("forever"));
        assert_eq!(cache.get("forever").item().expires_at, None);
    }

    #[test]
    fn test_save_copies_expiry_verbatim() {
        let cache = MemoryCache::new();
        let item = fresh("key1", "value1");
        let expected = item.expires_at;

        cache.save(item).unwrap();

        assert_eq!(cache.get("key1").item().expires_at, expected);
    }

    #[test]
    fn test_save_empty_key() {
        let cache = MemoryCache::new();

        let result = cache.save(CacheItem::new("", "value"));
        assert!(matches!(result, Err(CacheError::InvalidKey)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_overwrite() {
        let cache = MemoryCache::new();

        cache.save(fresh("key1", "value1")).unwrap();
        cache.save(fresh("key1", "value2")).unwrap();

        assert_eq!(cache.get("key1").value(), "value2");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_save_already_expired() {
        let cache = MemoryCache::new();

        cache.save(stale("old", "value")).unwrap();

        // Stored physically until the next read sweeps it
        assert_eq!(cache.len(), 1);
        assert!(!cache.has("old"));
        assert_eq!(cache.len(), 0);
        assert!(!cache.get("old").is_hit());
    }

    #[test]
    fn test_sweep_keeps_live_entries() {
        let cache = MemoryCache::new();

        cache.save(stale("old", "value")).unwrap();
        cache.save(fresh("new", "value")).unwrap();
        cache.save(CacheItem::new("forever", "value")).unwrap();

        assert!(!cache.get("unrelated").is_hit());
        assert_eq!(cache.keys(), vec!["forever".to_string(), "new".to_string()]);
    }

    #[test]
    fn test_delete() {
        let cache = MemoryCache::new();

        cache.save(fresh("key1", "value1")).unwrap();
        cache.delete("key1").unwrap();

        assert!(cache.is_empty());
        assert!(!cache.get("key1").is_hit());
    }

    #[test]
    fn test_delete_nonexistent() {
        let cache = MemoryCache::new();
        cache.save(fresh("other", "value")).unwrap();

        assert!(cache.delete("nonexistent").is_ok());
        assert!(cache.has("other"));
    }

    #[test]
    fn test_serialize_does_not_sweep() {
        let cache = MemoryCache::new();
        cache.save(stale("old", "value")).unwrap();

        let bytes = cache.serialize().unwrap();
        let restored = MemoryCache::from_bytes(&bytes).unwrap();

        assert_eq!(restored.len(), 1);
        assert!(!restored.has("old"));
    }

    #[test]
    fn test_unserialize_roundtrip() {
        let cache = MemoryCache::new();
        let item = fresh("key1", "value1");
        cache.save(item.clone()).unwrap();
        cache.save(CacheItem::new("key2", "value2")).unwrap();

        let restored = MemoryCache::new();
        restored.unserialize(&cache.serialize().unwrap()).unwrap();

        let lookup = restored.get("key1");
        assert!(lookup.is_hit());
        assert_eq!(lookup.into_item(), Some(item));
        assert!(restored.get("key2").is_hit());
    }

    #[test]
    fn test_unserialize_replaces_map() {
        let cache = MemoryCache::new();
        cache.save(fresh("stale_key", "value")).unwrap();

        let other = MemoryCache::new();
        other.save(fresh("key1", "value1")).unwrap();

        cache.unserialize(&other.serialize().unwrap()).unwrap();

        assert!(!cache.has("stale_key"));
        assert!(cache.has("key1"));
    }

    #[test]
    fn test_unserialize_invalid_keeps_state() {
        let cache = MemoryCache::new();
        cache.save(fresh("key1", "value1")).unwrap();

        let result = cache.unserialize(b"{broken");
        assert!(matches!(result, Err(CacheError::Decode(_))));
        assert!(cache.has("key1"));
    }

    #[test]
    fn test_close_is_noop() {
        let cache = MemoryCache::new();
        cache.save(fresh("key1", "value1")).unwrap();

        cache.close().unwrap();
        assert!(cache.has("key1"));
    }

    #[test]
    fn test_concurrent_saves() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..50 {
                        cache.save(fresh(&format!("k{t}_{i}"), "v")).unwrap();
                        assert!(cache.has(&format!("k{t}_{i}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
    }
}
