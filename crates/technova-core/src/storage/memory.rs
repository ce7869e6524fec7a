//! In-memory snapshot store
//!
//! Keeps snapshots in process memory and counts article writes, so callers
//! can check exactly when the save port was invoked.

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::error::{StorageError, StorageResult};
use super::SnapshotStore;
use crate::models::Article;
use crate::session::User;

#[derive(Debug, Default)]
struct Snapshots {
    articles: Option<Vec<Article>>,
    session: Option<User>,
    article_writes: usize,
    fail_writes: bool,
}

/// Snapshot store that never touches the filesystem
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    inner: Mutex<Snapshots>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing article snapshot
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let store = Self::new();
        store.lock().articles = Some(articles);
        store
    }

    /// Number of times the article snapshot was written
    pub fn article_writes(&self) -> usize {
        self.lock().article_writes
    }

    /// Make every following write fail, as a full disk would
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Current article snapshot
    pub fn articles(&self) -> Option<Vec<Article>> {
        self.lock().articles.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshots> {
        // Poisoning is ignored; every write replaces a whole snapshot
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(snapshots: &Snapshots, name: &str) -> StorageResult<()> {
        if snapshots.fail_writes {
            return Err(StorageError::from_io(
                io::Error::other("No space left on device"),
                PathBuf::from(name),
            ));
        }
        Ok(())
    }
}

impl SnapshotStore for MemoryPersistence {
    fn load_articles(&self) -> StorageResult<Option<Vec<Article>>> {
        Ok(self.lock().articles.clone())
    }

    fn save_articles(&self, articles: &[Article]) -> StorageResult<()> {
        let mut snapshots = self.lock();
        Self::check_writable(&snapshots, "news.json")?;
        snapshots.articles = Some(articles.to_vec());
        snapshots.article_writes += 1;
        Ok(())
    }

    fn load_session(&self) -> StorageResult<Option<User>> {
        Ok(self.lock().session.clone())
    }

    fn save_session(&self, user: &User) -> StorageResult<()> {
        let mut snapshots = self.lock();
        Self::check_writable(&snapshots, "user.json")?;
        snapshots.session = Some(user.clone());
        Ok(())
    }

    fn clear_session(&self) -> StorageResult<()> {
        self.lock().session = None;
        Ok(())
    }
}
