//! TechNova Core Library
//!
//! This crate provides the core functionality for TechNova, a local-first
//! IT news portal: articles with views, likes and comments, a derived
//! filtered/sorted view, a lightweight markup renderer, a mock sign-in flow
//! and generated summaries and titles.
//!
//! # Architecture
//!
//! - **ContentStore**: the ordered article collection, pure in-memory mutations
//! - **Portal**: owns the store and the session, gates operations on the
//!   session and writes a snapshot after every change
//! - **SnapshotStore**: persistence port (JSON files, or memory in tests)
//!
//! # Quick Start
//!
//! ```text
//! let mut portal = Portal::open()?;
//!
//! // Read the front page
//! let latest = portal.view(&ViewQuery::new());
//! for block in markup::render(&latest[0].body) { /* ... */ }
//!
//! // Sign in and react
//! portal.login(&MockAuthenticator, &Credentials::login("me@example.com", "pw"))?;
//! portal.toggle_like(&latest_id)?;
//! ```
//!
//! # Modules
//!
//! - `portal`: Application state (main entry point)
//! - `store`: Article collection and mutations
//! - `view`: Category/search filtering and Latest/Trending ordering
//! - `models`: Articles, comments, reactions, categories
//! - `draft`: Authoring form state
//! - `markup`: Lightweight markup to display blocks and HTML
//! - `session`: Users and authentication
//! - `completion`: Generated summaries and titles
//! - `catalog`: Category taxonomy, default articles, podcasts
//! - `storage`: Snapshot persistence
//! - `config`: Application configuration

pub mod catalog;
pub mod completion;
pub mod config;
pub mod draft;
pub mod markup;
pub mod models;
pub mod portal;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

pub use catalog::{default_articles, podcasts, CategoryInfo, CATEGORIES};
pub use completion::{
    Assistant, CompletionError, CompletionMode, GeminiCompleter, Suggestion, TextCompleter,
};
pub use config::Config;
pub use draft::{Draft, DEFAULT_COVER_IMAGE};
pub use markup::{Block, Inline};
pub use models::{
    Article, ArticleId, Category, Comment, CommentId, LikeState, Podcast, Reactions,
    ValidationError,
};
pub use portal::{Outcome, Portal, PortalError};
pub use session::{AuthError, Authenticator, Credentials, MockAuthenticator, User};
pub use storage::{
    JsonPersistence, MemoryPersistence, SnapshotStore, StorageError, StorageStats,
};
pub use store::{ContentStore, StoreError};
pub use view::{CategoryFilter, ViewMode, ViewQuery};
