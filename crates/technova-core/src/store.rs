//! In-memory content store
//!
//! `ContentStore` owns the ordered article collection and implements every
//! mutation as a plain in-memory update. It knows nothing about persistence
//! or sessions: `Portal` checks the session gate before calling in here and
//! invokes the save port afterwards.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ContentStore::seeded();
//! let id = store.publish(&draft, "Ann", today)?.id.clone();
//! store.record_view(&id)?;
//! store.toggle_like(&id, "user-1")?;
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::debug;

use crate::catalog;
use crate::draft::Draft;
use crate::models::{
    estimate_read_time, Article, ArticleId, Comment, CommentId, LikeState, Reactions,
    ValidationError,
};

/// Errors raised by store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No article with this id (or id prefix)
    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    /// No comment with this id on the article
    #[error("Comment {comment} not found on article {article}")]
    CommentNotFound { article: String, comment: String },

    /// An id prefix matched more than one item
    #[error("Ambiguous id '{prefix}' matches {matches} items. Please provide more characters.")]
    AmbiguousId { prefix: String, matches: usize },

    /// Required input was blank
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Ordered article collection, newest-authored first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentStore {
    articles: Vec<Article>,
}

impl ContentStore {
    /// Build a store from a loaded snapshot
    ///
    /// Articles saved before read times were tracked get an estimate here.
    pub fn new(mut articles: Vec<Article>) -> Self {
        for article in &mut articles {
            if article.read_time == 0 {
                article.read_time = estimate_read_time(&article.body);
            }
        }
        Self { articles }
    }

    /// Build a store holding the default seed articles
    pub fn seeded() -> Self {
        Self::new(catalog::default_articles())
    }

    /// All articles in store order
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Get an article by exact id
    pub fn get(&self, id: &ArticleId) -> Option<&Article> {
        self.articles.iter().find(|a| &a.id == id)
    }

    /// Resolve an exact id or a unique id prefix
    pub fn resolve(&self, id: &str) -> Result<&Article, StoreError> {
        if let Some(article) = self.articles.iter().find(|a| a.id.as_str() == id) {
            return Ok(article);
        }

        let matches: Vec<&Article> = self
            .articles
            .iter()
            .filter(|a| a.id.as_str().starts_with(id))
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::ArticleNotFound(id.to_string())),
            [article] => Ok(article),
            _ => Err(StoreError::AmbiguousId {
                prefix: id.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// Resolve an exact comment id or a unique prefix within one article
    pub fn resolve_comment<'a>(
        &self,
        article: &'a Article,
        id: &str,
    ) -> Result<&'a Comment, StoreError> {
        if let Some(comment) = article.comments.iter().find(|c| c.id.as_str() == id) {
            return Ok(comment);
        }

        let matches: Vec<&Comment> = article
            .comments
            .iter()
            .filter(|c| c.id.as_str().starts_with(id))
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::CommentNotFound {
                article: article.id.to_string(),
                comment: id.to_string(),
            }),
            [comment] => Ok(comment),
            _ => Err(StoreError::AmbiguousId {
                prefix: id.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// Publish a draft as a new article at the front of the collection
    pub fn publish(
        &mut self,
        draft: &Draft,
        author: &str,
        published: NaiveDate,
    ) -> Result<&Article, StoreError> {
        draft.validate()?;

        let mut article = Article {
            id: self.fresh_article_id(),
            title: draft.title().trim().to_string(),
            body: draft.body().to_string(),
            summary: draft.summary().trim().to_string(),
            category: draft.category(),
            author: author.to_string(),
            date: published,
            image_url: draft.image_url().to_string(),
            views: 0,
            reactions: Reactions::default(),
            comments: Vec::new(),
            tags: Vec::new(),
            read_time: estimate_read_time(draft.body()),
            is_hot: draft.is_hot(),
        };
        for tag in draft.tags() {
            article.add_tag(tag.as_str());
        }

        debug!(id = %article.id, author, "published article");
        self.articles.insert(0, article);
        Ok(&self.articles[0])
    }

    /// Increment an article's view counter, returning the new count
    pub fn record_view(&mut self, id: &ArticleId) -> Result<u64, StoreError> {
        let article = self.get_mut(id)?;
        article.views += 1;
        debug!(id = %id, views = article.views, "recorded view");
        Ok(article.views)
    }

    /// Toggle a user's like on an article
    pub fn toggle_like(&mut self, id: &ArticleId, user_id: &str) -> Result<LikeState, StoreError> {
        let article = self.get_mut(id)?;
        let state = article.reactions.toggle(user_id);
        debug!(id = %id, ?state, likes = article.likes(), "toggled article like");
        Ok(state)
    }

    /// Toggle a user's like on one comment of an article
    pub fn toggle_comment_like(
        &mut self,
        article_id: &ArticleId,
        comment_id: &CommentId,
        user_id: &str,
    ) -> Result<LikeState, StoreError> {
        let article = self.get_mut(article_id)?;
        let comment = article
            .comments
            .iter_mut()
            .find(|c| &c.id == comment_id)
            .ok_or_else(|| StoreError::CommentNotFound {
                article: article_id.to_string(),
                comment: comment_id.to_string(),
            })?;
        let state = comment.reactions.toggle(user_id);
        debug!(article = %article_id, comment = %comment_id, ?state, "toggled comment like");
        Ok(state)
    }

    /// Add a comment at the front of an article's comment list
    pub fn add_comment(
        &mut self,
        article_id: &ArticleId,
        author: &str,
        text: &str,
        written: DateTime<Utc>,
    ) -> Result<&Comment, StoreError> {
        if text.trim().is_empty() {
            return Err(ValidationError::MissingField("comment text").into());
        }

        let article = self.get_mut(article_id)?;
        let mut comment = Comment::new(author, text.trim(), written);
        while article.comments.iter().any(|c| c.id == comment.id) {
            comment.id = CommentId::generate();
        }

        debug!(article = %article_id, comment = %comment.id, "added comment");
        article.comments.insert(0, comment);
        Ok(&article.comments[0])
    }

    fn get_mut(&mut self, id: &ArticleId) -> Result<&mut Article, StoreError> {
        self.articles
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| StoreError::ArticleNotFound(id.to_string()))
    }

    fn fresh_article_id(&self) -> ArticleId {
        loop {
            let id = ArticleId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn draft(title: &str) -> Draft {
        let mut draft = Draft::new();
        draft.set_title(title);
        draft.set_body("Some **body** text");
        draft.set_summary("Short summary");
        draft.set_category(Category::Hardware);
        draft.add_tag("chips");
        draft
    }

    fn assert_likes_consistent(store: &ContentStore) {
        for article in store.articles() {
            assert_eq!(article.likes() as usize, article.reactions.liked_by().len());
            for comment in &article.comments {
                assert_eq!(
                    comment.reactions.likes() as usize,
                    comment.reactions.liked_by().len()
                );
            }
        }
    }

    #[test]
    fn test_seeded_store() {
        let store = ContentStore::seeded();
        assert_eq!(store.len(), 3);
        assert!(store.get(&ArticleId::from("1")).is_some());
    }

    #[test]
    fn test_new_fills_missing_read_time() {
        let mut articles = catalog::default_articles();
        articles[0].read_time = 0;
        let store = ContentStore::new(articles);
        assert!(store.articles()[0].read_time >= 1);
    }

    #[test]
    fn test_publish_prepends_with_fresh_state() {
        let mut store = ContentStore::seeded();
        let article = store.publish(&draft("Chips"), "Ann", today()).unwrap().clone();

        assert_eq!(store.len(), 4);
        assert_eq!(store.articles()[0].id, article.id);
        assert_eq!(article.views, 0);
        assert_eq!(article.likes(), 0);
        assert!(article.comments.is_empty());
        assert_eq!(article.date, today());
        assert_eq!(article.author, "Ann");
        assert_eq!(article.category, Category::Hardware);
        assert_eq!(article.tags, vec!["chips"]);
        assert_eq!(article.read_time, 1);
    }

    #[test]
    fn test_publish_ids_are_unique() {
        let mut store = ContentStore::default();
        let a = store.publish(&draft("A"), "Ann", today()).unwrap().id.clone();
        let b = store.publish(&draft("B"), "Ann", today()).unwrap().id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn test_publish_rejects_blank_title() {
        let mut store = ContentStore::seeded();
        let before = store.clone();

        let result = store.publish(&draft("  "), "Ann", today());
        assert_eq!(
            result.unwrap_err(),
            StoreError::Validation(ValidationError::MissingField("title"))
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_record_view_counts_every_call() {
        let mut store = ContentStore::seeded();
        let id = ArticleId::from("1");
        let start = store.get(&id).unwrap().views;

        store.record_view(&id).unwrap();
        let views = store.record_view(&id).unwrap();
        assert_eq!(views, start + 2);
    }

    #[test]
    fn test_record_view_unknown_article() {
        let mut store = ContentStore::seeded();
        let err = store.record_view(&ArticleId::from("missing")).unwrap_err();
        assert!(matches!(err, StoreError::ArticleNotFound(_)));
    }

    #[test]
    fn test_toggle_like_twice_restores_state() {
        let mut store = ContentStore::seeded();
        let id = ArticleId::from("2");
        let original = store.get(&id).unwrap().reactions.clone();

        assert_eq!(store.toggle_like(&id, "u1").unwrap(), LikeState::Liked);
        assert_likes_consistent(&store);
        assert_eq!(store.get(&id).unwrap().likes(), original.likes() + 1);

        assert_eq!(store.toggle_like(&id, "u1").unwrap(), LikeState::Unliked);
        assert_likes_consistent(&store);
        assert_eq!(store.get(&id).unwrap().reactions, original);
    }

    #[test]
    fn test_add_comment_prepends() {
        let mut store = ContentStore::seeded();
        let id = ArticleId::from("1");
        let now = Utc::now();

        let first = store.add_comment(&id, "Ann", "First!", now).unwrap().id.clone();
        let second = store.add_comment(&id, "Bob", "  Second  ", now).unwrap().clone();

        let article = store.get(&id).unwrap();
        assert_eq!(article.comments.len(), 2);
        assert_eq!(article.comments[0].id, second.id);
        assert_eq!(article.comments[1].id, first);
        assert_eq!(second.text, "Second");
        assert_eq!(second.reactions.likes(), 0);
    }

    #[test]
    fn test_add_comment_rejects_blank_text() {
        let mut store = ContentStore::seeded();
        let id = ArticleId::from("1");
        let err = store.add_comment(&id, "Ann", "   ", Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.get(&id).unwrap().comments.is_empty());
    }

    #[test]
    fn test_toggle_comment_like() {
        let mut store = ContentStore::seeded();
        let id = ArticleId::from("3");
        let comment_id = store
            .add_comment(&id, "Ann", "Nice", Utc::now())
            .unwrap()
            .id
            .clone();

        assert_eq!(
            store.toggle_comment_like(&id, &comment_id, "u9").unwrap(),
            LikeState::Liked
        );
        assert_likes_consistent(&store);
        assert_eq!(store.get(&id).unwrap().comments[0].reactions.likes(), 1);

        assert_eq!(
            store.toggle_comment_like(&id, &comment_id, "u9").unwrap(),
            LikeState::Unliked
        );
        assert_eq!(store.get(&id).unwrap().comments[0].reactions.likes(), 0);

        let err = store
            .toggle_comment_like(&id, &CommentId::from("nope"), "u9")
            .unwrap_err();
        assert!(matches!(err, StoreError::CommentNotFound { .. }));
    }

    #[test]
    fn test_resolve_by_prefix() {
        let mut store = ContentStore::default();
        let id = store.publish(&draft("A"), "Ann", today()).unwrap().id.clone();

        let prefix = &id.as_str()[..8];
        assert_eq!(store.resolve(prefix).unwrap().id, id);
        assert_eq!(store.resolve(id.as_str()).unwrap().id, id);
        assert!(matches!(
            store.resolve("zzzz-not-there"),
            Err(StoreError::ArticleNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_exact_id_wins_over_prefix() {
        let mut articles = catalog::default_articles();
        articles[1].id = ArticleId::from("10");
        let store = ContentStore::new(articles);

        // "1" is both an exact id and a prefix of "10"
        assert_eq!(store.resolve("1").unwrap().id, ArticleId::from("1"));
    }

    #[test]
    fn test_resolve_ambiguous_prefix() {
        let mut articles = catalog::default_articles();
        articles[0].id = ArticleId::from("abc1");
        articles[1].id = ArticleId::from("abc2");
        let store = ContentStore::new(articles);

        assert!(matches!(
            store.resolve("abc"),
            Err(StoreError::AmbiguousId { matches: 2, .. })
        ));
    }
}
