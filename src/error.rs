//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for memory and file backed caches.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Item key was empty
    #[error("Invalid key: cache keys must not be empty")]
    InvalidKey,

    /// Mutation attempted after the cache was closed
    #[error("Cache is closed")]
    Closed,

    /// Backing file could not be opened or created
    #[error("Error opening/creating file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file could not be read
    #[error("Error reading file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file does not hold a valid encoded cache
    #[error("Error decoding file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Backing file could not be truncated before a flush
    #[error("Error truncating file {}: {source}", path.display())]
    Truncate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file could not be rewound before a flush
    #[error("Error positioning file {}: {source}", path.display())]
    Seek {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Flushed bytes could not be written
    #[error("Error while saving file to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file could not be synced on close
    #[error("Error closing file {}: {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cache items could not be encoded
    #[error("Could not encode cache items: {0}")]
    Encode(#[source] serde_json::Error),

    /// Payload is not a valid encoded cache
    #[error("Error decoding cache items: {0}")]
    Decode(#[source] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
