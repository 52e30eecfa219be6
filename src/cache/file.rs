//! File Cache Module
//!
//! Durable decorator around [`MemoryCache`]. The backing file is read once on
//! open and fully rewritten on every mutation.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheItem, Lookup, MemoryCache};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Permissions for newly created backing files
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

// == File Cache ==
/// Cache persisted to a single file.
///
/// Lock order is always the file lock first, then the inner store's lock.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    /// Open handle, None once closed
    file: Mutex<Option<File>>,
    memory: MemoryCache,
}

impl FileCache {
    // == Constructor ==
    /// Opens or creates the backing file and hydrates the cache from it.
    ///
    /// An empty file yields an empty cache. A non-empty file must hold a
    /// payload written by [`Cache::serialize`]; anything else fails with
    /// [`CacheError::Corrupt`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = open_options()
            .open(&path)
            .map_err(|source| CacheError::Open {
                path: path.clone(),
                source,
            })?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|source| CacheError::Read {
                path: path.clone(),
                source,
            })?;

        let memory = MemoryCache::new();
        if !data.is_empty() {
            memory.unserialize(&data).map_err(|err| match err {
                CacheError::Decode(source) => CacheError::Corrupt {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;
        }

        info!(path = %path.display(), entries = memory.len(), "opened cache file");

        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
            memory,
        })
    }

    /// Opens the cache file named by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.cache_file)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Live keys of the in-memory working set.
    pub fn keys(&self) -> Vec<String> {
        let _guard = self.file.lock();
        self.memory.keys()
    }

    // == Flush ==
    /// Rewrites the backing file with the whole current store.
    ///
    /// Must be called with the file lock held.
    fn flush(&self, file: &mut File) -> Result<()> {
        let bytes = self.memory.serialize()?;

        file.set_len(0).map_err(|source| CacheError::Truncate {
            path: self.path.clone(),
            source,
        })?;
        file.seek(SeekFrom::Start(0))
            .map_err(|source| CacheError::Seek {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(&bytes).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "flushed cache file");
        Ok(())
    }

    /// Runs a mutation on the inner store and flushes, all under the file lock.
    ///
    /// The in-memory change is kept even when the flush fails; the next
    /// successful flush writes it out.
    fn mutate<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&MemoryCache) -> Result<()>,
    {
        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or(CacheError::Closed)?;

        op(&self.memory)?;

        self.flush(file).inspect_err(|err| {
            warn!(path = %self.path.display(), error = %err, "cache flush failed");
        })
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Lookup {
        let _guard = self.file.lock();
        self.memory.get(key)
    }

    fn has(&self, key: &str) -> bool {
        let _guard = self.file.lock();
        self.memory.has(key)
    }

    // == Delete ==
    /// Deletions are flushed like saves so they survive a reopen.
    fn delete(&self, key: &str) -> Result<()> {
        self.mutate(|memory| memory.delete(key))
    }

    // == Save ==
    fn save(&self, item: CacheItem) -> Result<()> {
        self.mutate(|memory| memory.save(item))
    }

    // == Close ==
    /// Syncs and releases the file handle without re-serializing. Closing
    /// an already closed cache does nothing.
    fn close(&self) -> Result<()> {
        let mut guard = self.file.lock();

        self.memory.close()?;

        let Some(file) = guard.take() else {
            return Ok(());
        };
        file.sync_all().map_err(|source| CacheError::Close {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), "closed cache file");
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        let _guard = self.file.lock();
        self.memory.serialize()
    }

    fn unserialize(&self, data: &[u8]) -> Result<()> {
        let _guard = self.file.lock();
        self.memory.unserialize(data)
    }
}

#[cfg(unix)]
fn open_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).mode(FILE_MODE);
    options
}

#[cfg(not(unix))]
fn open_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true);
    options
}
