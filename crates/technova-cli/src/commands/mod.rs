//! Command handlers

pub mod article;
pub mod auth;
pub mod catalog;
pub mod comment;
pub mod config;
pub mod status;
pub mod suggest;

use anyhow::{bail, Result};

use technova_core::{Article, ArticleId, JsonPersistence, Outcome, Portal, StoreError};

/// Shown when a gated command runs without a session
const SIGN_IN_HINT: &str = "You need to sign in first. Run `technova login`.";

/// Unwrap a gated outcome, failing with a sign-in hint when nobody is signed in
pub fn require_session<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Applied(value) => Ok(value),
        Outcome::AuthRequired => bail!(SIGN_IN_HINT),
    }
}

/// Resolve an article ID (supports full ID or prefix)
pub fn resolve_article<'a>(portal: &'a Portal<JsonPersistence>, id: &str) -> Result<&'a Article> {
    match portal.store().resolve(id) {
        Ok(article) => Ok(article),
        Err(StoreError::AmbiguousId { .. }) => {
            eprintln!("Multiple articles match '{}':", id);
            for article in portal.articles().iter().filter(|a| a.id.as_str().starts_with(id)) {
                eprintln!("  {} - {}", article.id, article.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve an article ID to an owned ID, for commands that mutate afterwards
pub fn resolve_article_id(portal: &Portal<JsonPersistence>, id: &str) -> Result<ArticleId> {
    resolve_article(portal, id).map(|article| article.id.clone())
}
