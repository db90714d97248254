//! Atomic JSON file operations.
//!
//! Provides a thin layer for safe access to JSON document files:
//! all-or-nothing updates via a tmp file + atomic rename, explicit fsync
//! before the rename, and an advisory directory lock for read-modify-write
//! sequences spanning multiple documents.

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tradepost_core::error::{MarketError, Result};

/// A handle to one JSON document on disk.
///
/// Writes go to a hidden tmp file in the same directory, are synced, and
/// renamed into place, so a reader never observes a half-written document.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a handle. The file itself may not exist yet.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded
    /// - `Ok(None)`: File does not exist or is empty
    /// - `Err(MarketError)`: Read or parse failure
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Serializes and writes the document atomically.
    ///
    /// The parent directory is created if missing.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Removes the document. Removing a missing file is a no-op.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self.path.parent().ok_or_else(|| {
            MarketError::storage("atomic write", "path has no parent directory")
        })?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| MarketError::storage("atomic write", "path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// An exclusive advisory lock over a store directory.
///
/// Held for the duration of any read-modify-write sequence so two
/// processes sharing the same data directory never interleave a batch.
/// The lock releases when the guard drops.
pub struct DirLock {
    #[allow(dead_code)]
    file: File,
}

impl DirLock {
    /// Blocks until the lock file under `dir` is exclusively held.
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let lock_path = dir.join(".store.lock");

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        file.lock_exclusive().map_err(|error| {
            MarketError::storage("directory lock", error.to_string())
        })?;

        Ok(Self { file })
    }
}
