//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

/// Default backing file when `CACHE_FILE` is not set
pub const DEFAULT_CACHE_FILE: &str = "cache.json";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the file backing a durable cache
    pub cache_file: PathBuf,
    /// TTL in seconds applied to items saved without an explicit expiry,
    /// None = items never expire
    pub default_ttl: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_FILE` - Backing file path (default: cache.json)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 or unset disables it
    pub fn from_env() -> Self {
        Self {
            cache_file: env::var("CACHE_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE)),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0),
        }
    }

    /// Absolute expiry for an item saved at `now` under the default TTL.
    ///
    /// A TTL too large to represent as an instant never expires.
    pub fn default_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.default_ttl.and_then(|secs| expiry_after(now, secs))
    }
}

/// Instant `secs` seconds after `now`, None if it overflows.
pub fn expiry_after(now: DateTime<Utc>, secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(secs).ok()?;
    now.checked_add_signed(Duration::try_seconds(secs)?)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            default_ttl: None,
        }
    }
}
