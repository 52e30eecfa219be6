//! Cache Module
//!
//! Provides an in-memory cache with lazy TTL expiration and a file backed
//! decorator that persists the whole store on every write.

mod codec;
mod file;
mod item;
mod memory;


// Re-export public types
pub use file::FileCache;
pub use item::{CacheItem, Lookup};
pub use memory::MemoryCache;

use crate::error::Result;

// == Cache Contract ==
/// Operations shared by every cache implementation.
///
/// Implementations differ only in durability: callers see the same behavior
/// from [`MemoryCache`] and [`FileCache`].
pub trait Cache: Send + Sync {
    /// Returns a copy of the item if present and unexpired, a miss otherwise.
    fn get(&self, key: &str) -> Lookup;

    /// True if the key is present and unexpired.
    fn has(&self, key: &str) -> bool;

    /// Removes the key. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;

    /// Inserts or overwrites the item under its key.
    fn save(&self, item: CacheItem) -> Result<()>;

    /// Releases any resources held by the cache.
    fn close(&self) -> Result<()>;

    /// Encodes the whole store into its persisted representation.
    fn serialize(&self) -> Result<Vec<u8>>;

    /// Replaces the whole store with a decoded persisted representation.
    fn unserialize(&self, data: &[u8]) -> Result<()>;
}
