//! Application state
//!
//! The `Portal` owns the content store, the current session and a snapshot
//! store, and is the only way front ends change anything:
//! - gated operations check the session first and return
//!   [`Outcome::AuthRequired`] without touching state when nobody is signed in
//! - every successful mutation writes the full article snapshot
//!
//! ## Usage
//!
//! ```ignore
//! let mut portal = Portal::open()?;
//! portal.login(&MockAuthenticator, &Credentials::login("me@example.com", "pw"))?;
//!
//! let view = portal.view(&ViewQuery::new().with_mode(ViewMode::Trending));
//! let id = view[0].id.clone();
//! portal.record_view(&id)?;
//! portal.toggle_like(&id)?;
//! ```

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::draft::Draft;
use crate::models::{Article, ArticleId, CommentId, LikeState, ValidationError};
use crate::session::{AuthError, Authenticator, Credentials, User};
use crate::storage::{JsonPersistence, SnapshotStore, StorageError};
use crate::store::{ContentStore, StoreError};
use crate::view::ViewQuery;

/// Result of an operation that needs a signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The operation ran
    Applied(T),
    /// Nobody is signed in; the caller should send the user to sign in
    AuthRequired,
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    /// The value, if the operation ran
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::AuthRequired => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(value) => Outcome::Applied(f(value)),
            Outcome::AuthRequired => Outcome::AuthRequired,
        }
    }
}

/// Errors raised by portal operations
#[derive(Error, Debug)]
pub enum PortalError {
    /// Required input was blank; nothing changed
    #[error(transparent)]
    Validation(ValidationError),

    /// Unknown or ambiguous id
    #[error(transparent)]
    Store(StoreError),

    /// The change was applied in memory but could not be saved
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Sign-in failed
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl PortalError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PortalError::Validation(_) | PortalError::Auth(AuthError::Invalid(_))
        )
    }
}

impl From<StoreError> for PortalError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(e) => PortalError::Validation(e),
            other => PortalError::Store(other),
        }
    }
}

impl From<ValidationError> for PortalError {
    fn from(error: ValidationError) -> Self {
        PortalError::Validation(error)
    }
}

/// News portal state: articles, session and persistence
pub struct Portal<S> {
    store: ContentStore,
    session: Option<User>,
    snapshots: S,
}

impl Portal<JsonPersistence> {
    /// Open the portal from the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the portal with a specific configuration
    pub fn open_with_config(config: Config) -> Self {
        Self::new(JsonPersistence::new(config))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        self.snapshots.config()
    }
}

impl<S: SnapshotStore> Portal<S> {
    /// Load state from a snapshot store
    ///
    /// A missing article snapshot yields the default articles. An unreadable
    /// one is logged and also replaced by the defaults; the session is treated
    /// the same way, falling back to signed out.
    pub fn new(snapshots: S) -> Self {
        let store = match snapshots.load_articles() {
            Ok(Some(articles)) => ContentStore::new(articles),
            Ok(None) => {
                debug!("no article snapshot, using defaults");
                ContentStore::seeded()
            }
            Err(e) => {
                warn!(error = %e, "could not load articles, using defaults");
                ContentStore::seeded()
            }
        };

        let session = snapshots.load_session().unwrap_or_else(|e| {
            warn!(error = %e, "could not load session, signing out");
            None
        });

        Self {
            store,
            session,
            snapshots,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn articles(&self) -> &[Article] {
        self.store.articles()
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    /// The signed-in user, if any
    pub fn session(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Filtered, sorted view of the articles
    pub fn view(&self, query: &ViewQuery) -> Vec<&Article> {
        query.project(self.store.articles())
    }

    /// Sign in, replacing any current session
    pub fn login(
        &mut self,
        authenticator: &impl Authenticator,
        credentials: &Credentials,
    ) -> Result<&User, PortalError> {
        let user = authenticator.authenticate(credentials)?;
        self.snapshots.save_session(&user)?;
        info!(user = %user.username, "signed in");
        Ok(self.session.insert(user))
    }

    /// Sign out, returning the user that was signed in
    pub fn logout(&mut self) -> Result<Option<User>, PortalError> {
        self.snapshots.clear_session()?;
        let user = self.session.take();
        if let Some(user) = &user {
            info!(user = %user.username, "signed out");
        }
        Ok(user)
    }

    /// Publish a draft under the signed-in user's name, dated today
    pub fn publish(&mut self, draft: &Draft) -> Result<Outcome<ArticleId>, PortalError> {
        let Some(user) = &self.session else {
            return Ok(Outcome::AuthRequired);
        };

        let today = Local::now().date_naive();
        let id = self.store.publish(draft, &user.username, today)?.id.clone();
        self.save()?;
        Ok(Outcome::Applied(id))
    }

    /// Count one view of an article; needs no session
    pub fn record_view(&mut self, id: &ArticleId) -> Result<u64, PortalError> {
        let views = self.store.record_view(id)?;
        self.save()?;
        Ok(views)
    }

    /// Like or unlike an article as the signed-in user
    pub fn toggle_like(&mut self, id: &ArticleId) -> Result<Outcome<LikeState>, PortalError> {
        let Some(user) = &self.session else {
            return Ok(Outcome::AuthRequired);
        };

        let state = self.store.toggle_like(id, &user.id)?;
        self.save()?;
        Ok(Outcome::Applied(state))
    }

    /// Like or unlike a comment as the signed-in user
    pub fn toggle_comment_like(
        &mut self,
        article_id: &ArticleId,
        comment_id: &CommentId,
    ) -> Result<Outcome<LikeState>, PortalError> {
        let Some(user) = &self.session else {
            return Ok(Outcome::AuthRequired);
        };

        let state = self
            .store
            .toggle_comment_like(article_id, comment_id, &user.id)?;
        self.save()?;
        Ok(Outcome::Applied(state))
    }

    /// Comment on an article as the signed-in user
    pub fn add_comment(
        &mut self,
        article_id: &ArticleId,
        text: &str,
    ) -> Result<Outcome<CommentId>, PortalError> {
        let Some(user) = &self.session else {
            return Ok(Outcome::AuthRequired);
        };

        let id = self
            .store
            .add_comment(article_id, &user.username, text, Utc::now())?
            .id
            .clone();
        self.save()?;
        Ok(Outcome::Applied(id))
    }

    fn save(&self) -> Result<(), StorageError> {
        self.snapshots.save_articles(self.store.articles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_articles;
    use crate::models::Category;
    use crate::session::MockAuthenticator;
    use crate::storage::MemoryPersistence;
    use crate::view::{CategoryFilter, ViewMode};
    use std::fs;
    use tempfile::TempDir;

    fn anonymous() -> Portal<MemoryPersistence> {
        Portal::new(MemoryPersistence::new())
    }

    fn signed_in() -> Portal<MemoryPersistence> {
        let mut portal = anonymous();
        portal
            .login(
                &MockAuthenticator,
                &Credentials::register("Ann", "ann@example.com", "pw"),
            )
            .unwrap();
        portal
    }

    fn filled_draft() -> Draft {
        let mut draft = Draft::new();
        draft.set_title("Rust 2.0 announced");
        draft.set_body("## What changed\nA **lot**.");
        draft.set_summary("Big news");
        draft.set_category(Category::Web);
        draft
    }

    fn first_id(portal: &Portal<MemoryPersistence>) -> ArticleId {
        portal.articles()[0].id.clone()
    }

    #[test]
    fn test_missing_snapshot_uses_defaults() {
        let portal = anonymous();
        assert_eq!(portal.articles(), default_articles().as_slice());
        assert!(portal.session().is_none());
        assert_eq!(portal.snapshots().article_writes(), 0);
    }

    #[test]
    fn test_loads_existing_snapshot() {
        let mut articles = default_articles();
        articles.truncate(1);
        let portal = Portal::new(MemoryPersistence::with_articles(articles));
        assert_eq!(portal.store().len(), 1);
    }

    #[test]
    fn test_publish_requires_session() {
        let mut portal = anonymous();
        let outcome = portal.publish(&filled_draft()).unwrap();

        assert_eq!(outcome, Outcome::AuthRequired);
        assert_eq!(portal.store().len(), 3);
        assert_eq!(portal.snapshots().article_writes(), 0);
    }

    #[test]
    fn test_publish_prepends_and_saves() {
        let mut portal = signed_in();
        let id = portal.publish(&filled_draft()).unwrap().applied().unwrap();

        let article = &portal.articles()[0];
        assert_eq!(article.id, id);
        assert_eq!(article.author, "Ann");
        assert_eq!(article.views, 0);
        assert_eq!(article.likes(), 0);
        assert!(article.comments.is_empty());
        assert_eq!(article.date, Local::now().date_naive());
        assert_eq!(portal.store().len(), 4);
        assert_eq!(portal.snapshots().article_writes(), 1);
        assert_eq!(portal.snapshots().articles().unwrap()[0].id, id);
    }

    #[test]
    fn test_empty_title_rejected_without_write() {
        let mut portal = signed_in();
        let mut draft = filled_draft();
        draft.set_title("   ");

        let err = portal.publish(&draft).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            PortalError::Validation(ValidationError::MissingField("title"))
        ));
        assert_eq!(portal.store().len(), 3);
        assert_eq!(portal.snapshots().article_writes(), 0);
    }

    #[test]
    fn test_record_view_without_session() {
        let mut portal = anonymous();
        let id = first_id(&portal);
        let before = portal.articles()[0].views;

        portal.record_view(&id).unwrap();
        let after = portal.record_view(&id).unwrap();

        assert_eq!(after, before + 2);
        assert_eq!(portal.snapshots().article_writes(), 2);
    }

    #[test]
    fn test_record_view_with_session() {
        let mut portal = signed_in();
        let id = first_id(&portal);
        let before = portal.articles()[0].views;

        portal.record_view(&id).unwrap();
        portal.record_view(&id).unwrap();
        assert_eq!(portal.articles()[0].views, before + 2);
    }

    #[test]
    fn test_record_view_unknown_article() {
        let mut portal = anonymous();
        let err = portal.record_view(&ArticleId::from("missing")).unwrap_err();
        assert!(matches!(err, PortalError::Store(StoreError::ArticleNotFound(_))));
        assert_eq!(portal.snapshots().article_writes(), 0);
    }

    #[test]
    fn test_anonymous_like_redirects() {
        let mut portal = anonymous();
        let id = first_id(&portal);
        let before = portal.articles()[0].reactions.clone();

        assert_eq!(portal.toggle_like(&id).unwrap(), Outcome::AuthRequired);
        assert_eq!(portal.articles()[0].reactions, before);
        assert_eq!(portal.snapshots().article_writes(), 0);
    }

    #[test]
    fn test_double_like_restores_state() {
        let mut portal = signed_in();
        let id = first_id(&portal);
        let before = portal.articles()[0].reactions.clone();
        let user_id = portal.session().unwrap().id.clone();

        assert_eq!(
            portal.toggle_like(&id).unwrap(),
            Outcome::Applied(LikeState::Liked)
        );
        let liked = &portal.articles()[0];
        assert_eq!(liked.likes(), before.likes() + 1);
        assert!(liked.reactions.is_liked_by(&user_id));
        assert_eq!(liked.likes() as usize, liked.reactions.liked_by().len());

        assert_eq!(
            portal.toggle_like(&id).unwrap(),
            Outcome::Applied(LikeState::Unliked)
        );
        assert_eq!(portal.articles()[0].reactions, before);
        assert_eq!(portal.snapshots().article_writes(), 2);
    }

    #[test]
    fn test_comments() {
        let mut portal = signed_in();
        let article_id = first_id(&portal);

        let first = portal
            .add_comment(&article_id, "First!")
            .unwrap()
            .applied()
            .unwrap();
        let second = portal
            .add_comment(&article_id, "  Second  ")
            .unwrap()
            .applied()
            .unwrap();

        let comments = &portal.articles()[0].comments;
        assert_eq!(comments[0].id, second);
        assert_eq!(comments[0].text, "Second");
        assert_eq!(comments[0].author, "Ann");
        assert_eq!(comments[1].id, first);

        assert_eq!(
            portal.toggle_comment_like(&article_id, &first).unwrap(),
            Outcome::Applied(LikeState::Liked)
        );
        assert_eq!(portal.articles()[0].comment(&first).unwrap().reactions.likes(), 1);
        assert_eq!(portal.snapshots().article_writes(), 3);
    }

    #[test]
    fn test_blank_comment_rejected() {
        let mut portal = signed_in();
        let id = first_id(&portal);
        let err = portal.add_comment(&id, " \n ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(portal.snapshots().article_writes(), 0);
    }

    #[test]
    fn test_anonymous_comment_operations_redirect() {
        let mut portal = signed_in();
        let article_id = first_id(&portal);
        let comment_id = portal
            .add_comment(&article_id, "hi")
            .unwrap()
            .applied()
            .unwrap();
        portal.logout().unwrap();
        let before = portal.articles().to_vec();

        assert_eq!(
            portal.add_comment(&article_id, "again").unwrap(),
            Outcome::AuthRequired
        );
        assert_eq!(
            portal.toggle_comment_like(&article_id, &comment_id).unwrap(),
            Outcome::AuthRequired
        );
        assert_eq!(portal.articles(), before.as_slice());
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut portal = anonymous();
        portal.snapshots().fail_writes(true);
        let id = first_id(&portal);

        let err = portal.record_view(&id).unwrap_err();
        assert!(matches!(err, PortalError::Storage(_)));
    }

    #[test]
    fn test_view_uses_current_state() {
        let mut portal = signed_in();
        let id = portal.publish(&filled_draft()).unwrap().applied().unwrap();

        let query = ViewQuery::new()
            .with_category(CategoryFilter::Only(Category::Web))
            .with_mode(ViewMode::Latest);
        let view = portal.view(&query);
        assert_eq!(view[0].id, id);
        assert!(view.iter().all(|a| a.category == Category::Web));
    }

    #[test]
    fn test_login_validation_error() {
        let mut portal = anonymous();
        let err = portal
            .login(&MockAuthenticator, &Credentials::login("", "pw"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!portal.is_signed_in());
    }

    #[test]
    fn test_session_persists_across_reopen_and_logout_removes_it() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let mut portal = Portal::open_with_config(config.clone());
        let user = portal
            .login(&MockAuthenticator, &Credentials::login("dev@example.com", "pw"))
            .unwrap()
            .clone();
        let id = portal.articles()[0].id.clone();
        assert!(portal.toggle_like(&id).unwrap().is_applied());

        let mut reopened = Portal::open_with_config(config.clone());
        assert_eq!(reopened.session(), Some(&user));
        assert!(reopened.articles()[0].reactions.is_liked_by(&user.id));

        assert_eq!(reopened.logout().unwrap(), Some(user));
        assert!(!config.session_path().exists());
        assert!(Portal::open_with_config(config).session().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        fs::write(config.articles_path(), "[{\"id\": 1").unwrap();

        let portal = Portal::open_with_config(config.clone());
        assert_eq!(portal.articles(), default_articles().as_slice());
        assert!(temp_dir.path().join("news.json.corrupt.backup").exists());
    }
}
