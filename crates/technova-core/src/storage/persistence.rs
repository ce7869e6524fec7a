//! JSON snapshot persistence
//!
//! Saves and loads portal snapshots as JSON files. Uses atomic writes (write to
//! temp file, then rename) so a crash never leaves a half-written snapshot.
//!
//! Storage location: `~/.local/share/technova/` (configurable via `Config`)
//!
//! Files:
//! - `news.json` - The article collection
//! - `user.json` - The signed-in user, absent when logged out

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::SnapshotStore;
use crate::config::Config;
use crate::models::Article;
use crate::session::User;

/// Suffix appended to a snapshot that failed to parse
const CORRUPT_BACKUP_SUFFIX: &str = ".corrupt.backup";

/// Snapshot persistence backed by JSON files in the data directory
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    config: Config,
}

impl JsonPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if an article snapshot exists on disk
    pub fn exists(&self) -> bool {
        self.config.articles_path().exists()
    }

    /// Sizes of the snapshot files
    pub fn stats(&self) -> StorageStats {
        let articles_size = file_size(&self.config.articles_path());
        let session_size = file_size(&self.config.session_path());
        StorageStats {
            articles_exist: articles_size.is_some(),
            session_exists: session_size.is_some(),
            articles_size: articles_size.unwrap_or(0),
            session_size: session_size.unwrap_or(0),
        }
    }
}

impl SnapshotStore for JsonPersistence {
    fn load_articles(&self) -> StorageResult<Option<Vec<Article>>> {
        read_snapshot(&self.config.articles_path())
    }

    fn save_articles(&self, articles: &[Article]) -> StorageResult<()> {
        write_snapshot(&self.config.articles_path(), articles)
    }

    fn load_session(&self) -> StorageResult<Option<User>> {
        read_snapshot(&self.config.session_path())
    }

    fn save_session(&self, user: &User) -> StorageResult<()> {
        write_snapshot(&self.config.session_path(), user)
    }

    fn clear_session(&self) -> StorageResult<()> {
        let path = self.config.session_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = ?path, "removed session snapshot");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

/// Storage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub articles_exist: bool,
    pub session_exists: bool,
    /// Article snapshot size in bytes
    pub articles_size: u64,
    /// Session snapshot size in bytes
    pub session_size: u64,
}

impl StorageStats {
    pub fn total_size(&self) -> u64 {
        self.articles_size + self.session_size
    }

    /// Total size formatted for people, e.g. `12.3 KB`
    pub fn total_size_human(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

        let total = self.total_size();
        if total < 1024 {
            return format!("{} B", total);
        }

        let mut size = total as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

/// Read and parse a snapshot
///
/// A missing file yields `None`. A file that does not parse is copied to
/// `<file>.corrupt.backup` and reported as [`StorageError::CorruptDocument`].
fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::from_read(e, path.to_path_buf())),
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let backup_path = backup_path_for(path);
            if let Err(copy_err) = fs::copy(path, &backup_path) {
                warn!(path = ?path, error = %copy_err, "could not back up corrupt snapshot");
            }
            Err(StorageError::CorruptDocument {
                path: path.to_path_buf(),
                backup_path,
                details: e.to_string(),
            })
        }
    }
}

/// Serialize and atomically overwrite a snapshot
fn write_snapshot<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, &bytes)?;
    debug!(path = ?path, bytes = bytes.len(), "saved snapshot");
    Ok(())
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(CORRUPT_BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
