//! Comment command handlers

use anyhow::Result;

use technova_core::{JsonPersistence, LikeState, Portal};

use super::{require_session, resolve_article, resolve_article_id};
use crate::output::{short_id, Output};

/// Comment on an article as the signed-in user
pub fn add(
    portal: &mut Portal<JsonPersistence>,
    article_id: &str,
    text: &str,
    output: &Output,
) -> Result<()> {
    let article_id = resolve_article_id(portal, article_id)?;
    let comment_id = require_session(portal.add_comment(&article_id, text)?)?;

    if output.is_quiet() {
        println!("{}", comment_id);
    } else if output.is_json() {
        output.json(&serde_json::json!({
            "article_id": article_id,
            "comment_id": comment_id
        }));
    } else {
        output.success(&format!(
            "Commented on {} ({})",
            short_id(article_id.as_str()),
            short_id(comment_id.as_str())
        ));
    }
    Ok(())
}

/// List the comments on an article
pub fn list(portal: &Portal<JsonPersistence>, article_id: &str, output: &Output) -> Result<()> {
    let article = resolve_article(portal, article_id)?;
    output.print_comments(article);
    Ok(())
}

/// Like or unlike a comment
pub fn like(
    portal: &mut Portal<JsonPersistence>,
    article_id: &str,
    comment_id: &str,
    output: &Output,
) -> Result<()> {
    let article = resolve_article(portal, article_id)?;
    let comment = portal.store().resolve_comment(article, comment_id)?;
    let (article_id, comment_id) = (article.id.clone(), comment.id.clone());

    let state = require_session(portal.toggle_comment_like(&article_id, &comment_id)?)?;

    let likes = portal
        .store()
        .get(&article_id)
        .and_then(|a| a.comment(&comment_id))
        .map_or(0, |c| c.reactions.likes());
    match state {
        LikeState::Liked => output.success(&format!("Liked comment ({} likes)", likes)),
        LikeState::Unliked => output.success(&format!("Like removed ({} likes)", likes)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use technova_core::{Config, Credentials, MockAuthenticator};
    use tempfile::TempDir;

    fn signed_in_portal(temp_dir: &TempDir) -> Portal<JsonPersistence> {
        let mut portal = Portal::open_with_config(Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        });
        portal
            .login(
                &MockAuthenticator,
                &Credentials::register("Mira", "mira@example.com", "pw"),
            )
            .unwrap();
        portal
    }

    #[test]
    fn test_add_and_like_comment() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = signed_in_portal(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);

        add(&mut portal, "3", "Great read", &output).unwrap();
        let article = portal.store().resolve("3").unwrap();
        let comment = article.comments.last().unwrap().clone();
        assert_eq!(comment.author, "Mira");
        assert_eq!(comment.text, "Great read");

        like(&mut portal, "3", &comment.id.as_str()[..12], &output).unwrap();
        let article = portal.store().resolve("3").unwrap();
        assert_eq!(article.comment(&comment.id).unwrap().reactions.likes(), 1);
    }

    #[test]
    fn test_blank_comment_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = signed_in_portal(&temp_dir);
        let before = portal.store().resolve("1").unwrap().comments.len();

        assert!(add(&mut portal, "1", "   ", &Output::new(OutputFormat::Quiet)).is_err());
        assert_eq!(portal.store().resolve("1").unwrap().comments.len(), before);
    }

    #[test]
    fn test_add_requires_login() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = signed_in_portal(&temp_dir);
        portal.logout().unwrap();

        let err = add(&mut portal, "1", "hi", &Output::new(OutputFormat::Quiet)).unwrap_err();
        assert!(err.to_string().contains("technova login"));
    }
}
