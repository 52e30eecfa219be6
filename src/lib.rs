//! File Cache - an embeddable expiring key-value cache
//!
//! Provides an in-memory store with lazy TTL expiration and a decorator that
//! persists the whole store to a single file on every write.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheItem, FileCache, Lookup, MemoryCache};
pub use config::Config;
pub use error::{CacheError, Result};
