//! Durable key-value storage backing the session.
//!
//! DESIGN
//! ======
//! Reads are served from memory and never fail. Every mutation is written
//! through to the medium before the call returns. A batch of writes reaches
//! the medium as one replacement, so callers can update several keys without
//! leaving a half-written state behind.
//!
//! TRADE-OFFS
//! ==========
//! `FileStorage` loads the file once at open. A second process writing the
//! same file is not observed until the next open.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage file {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One mutation inside a [`KeyValueStorage::write`] batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageWrite<'a> {
    Set(&'a str, &'a str),
    Remove(&'a str),
}

/// Synchronous key-value primitive with get/set/clear semantics.
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Apply all writes, then persist once.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium rejects the write.
    fn write(&mut self, batch: &[StorageWrite<'_>]) -> Result<(), StorageError>;

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium rejects the write.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the medium rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(&[StorageWrite::Set(key, value)])
    }

    /// # Errors
    ///
    /// Returns an error if the medium rejects the write.
    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.write(&[StorageWrite::Remove(key)])
    }
}

fn apply(entries: &mut BTreeMap<String, String>, batch: &[StorageWrite<'_>]) {
    for op in batch {
        match *op {
            StorageWrite::Set(key, value) => {
                entries.insert(key.to_owned(), value.to_owned());
            }
            StorageWrite::Remove(key) => {
                entries.remove(key);
            }
        }
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, batch: &[StorageWrite<'_>]) -> Result<(), StorageError> {
        apply(&mut self.entries, batch);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-object file storage, written through on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A missing file is an empty store; the file is created on first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt { path: path.clone(), source })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_vec_pretty(entries).map_err(|e| io_err(io::Error::other(e)))?;

        // Replace via rename so readers never see a truncated file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, batch: &[StorageWrite<'_>]) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        apply(&mut next, batch);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let next = BTreeMap::new();
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
