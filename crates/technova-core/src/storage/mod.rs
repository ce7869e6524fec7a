//! Storage layer
//!
//! The portal persists two independent snapshots: the full article collection
//! and the signed-in user. Both go through the [`SnapshotStore`] port, which
//! always writes a whole snapshot and never patches.
//!
//! ## Implementations
//!
//! - [`JsonPersistence`]: JSON files in the data directory, atomic writes
//! - [`MemoryPersistence`]: in-process, counts writes; used by tests

pub mod error;
pub mod memory;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryPersistence;
pub use persistence::{JsonPersistence, StorageStats};

use crate::models::Article;
use crate::session::User;

/// Load and save whole snapshots of portal state
pub trait SnapshotStore {
    /// Load the article collection; `None` when nothing was saved yet
    fn load_articles(&self) -> StorageResult<Option<Vec<Article>>>;

    /// Overwrite the article collection
    fn save_articles(&self, articles: &[Article]) -> StorageResult<()>;

    /// Load the signed-in user; `None` when logged out
    fn load_session(&self) -> StorageResult<Option<User>>;

    /// Overwrite the signed-in user
    fn save_session(&self, user: &User) -> StorageResult<()>;

    /// Remove the signed-in user
    fn clear_session(&self) -> StorageResult<()>;
}
