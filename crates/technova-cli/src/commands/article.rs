//! Article command handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use technova_core::markup;
use technova_core::{
    Assistant, Category, CategoryFilter, CompletionMode, Draft, JsonPersistence, LikeState,
    Outcome, Portal, ViewMode, ViewQuery,
};

use super::{require_session, resolve_article, resolve_article_id};
use crate::editor;
use crate::output::{Output, OutputFormat};

/// Arguments for `technova publish`
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Headline (generated from the body with --suggest-title)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Short summary (generated from the body with --suggest-summary)
    #[arg(short, long)]
    pub summary: Option<String>,
    /// Body text (opens $EDITOR if neither this nor --body-file is given)
    #[arg(short, long, conflicts_with = "body_file")]
    pub body: Option<String>,
    /// Read the body from a file
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,
    /// Category
    #[arg(short, long, default_value = "AI")]
    pub category: Category,
    /// Cover image URL
    #[arg(short, long)]
    pub image: Option<String>,
    /// Tags to add
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Feature the article on the front page
    #[arg(long)]
    pub hot: bool,
    /// Generate the summary from the body
    #[arg(long, conflicts_with = "summary")]
    pub suggest_summary: bool,
    /// Generate the title from the body
    #[arg(long, conflicts_with = "title")]
    pub suggest_title: bool,
}

/// List articles through the view engine
pub fn list(
    portal: &Portal<JsonPersistence>,
    category: CategoryFilter,
    search: Option<String>,
    trending: bool,
    hot: bool,
    output: &Output,
) -> Result<()> {
    let mode = if trending {
        ViewMode::Trending
    } else {
        ViewMode::Latest
    };
    let query = ViewQuery::new()
        .with_category(category)
        .with_search(search.unwrap_or_default())
        .with_mode(mode);

    let mut articles = portal.view(&query);
    if hot {
        articles.retain(|a| a.is_hot);
    }

    output.print_articles(&articles);
    Ok(())
}

/// Read an article; every call counts one view
pub fn show(
    portal: &mut Portal<JsonPersistence>,
    id: &str,
    html: bool,
    output: &Output,
) -> Result<()> {
    let id = resolve_article_id(portal, id)?;
    portal.record_view(&id).context("Failed to record view")?;

    let article = resolve_article(portal, id.as_str())?;
    if html && output.format == OutputFormat::Human {
        print!("{}", markup::to_html(markup::render(&article.body)));
    } else {
        output.print_article(article);
    }
    Ok(())
}

/// Publish a new article as the signed-in user
pub async fn publish(
    portal: &mut Portal<JsonPersistence>,
    args: PublishArgs,
    output: &Output,
) -> Result<()> {
    // Check the session before asking for a body or calling the completion service
    if !portal.is_signed_in() {
        return require_session(Outcome::AuthRequired);
    }

    let mut draft = Draft::new();
    draft.set_category(args.category);
    if let Some(image) = args.image {
        draft.set_image_url(image);
    }
    for tag in args.tags {
        draft.add_tag(tag);
    }
    draft.set_hot(args.hot);

    let body = match (args.body, args.body_file) {
        (Some(body), _) => body,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read body file: {:?}", path))?,
        (None, None) => editor::edit_body(args.title.as_deref().unwrap_or(""))?,
    };
    draft.set_body(body);
    if let Some(title) = args.title {
        draft.set_title(title);
    }
    if let Some(summary) = args.summary {
        draft.set_summary(summary);
    }

    if args.suggest_title || args.suggest_summary {
        if draft.body().trim().is_empty() {
            bail!("Write the article body first; suggestions are generated from it.");
        }
        let assistant = Assistant::from_config(portal.config())
            .context("Failed to set up text completion")?;

        if args.suggest_title {
            let suggestion = assistant.suggest_for(&draft, CompletionMode::Title).await;
            draft.apply(suggestion);
        }
        if args.suggest_summary {
            let suggestion = assistant.suggest_for(&draft, CompletionMode::Summary).await;
            draft.apply(suggestion);
        }
    }

    let id = require_session(portal.publish(&draft)?)?;

    output.success(&format!("Published article: {}", id));
    if let Some(article) = portal.store().get(&id) {
        output.print_article(article);
    }
    Ok(())
}

/// Like or unlike an article
pub fn like(portal: &mut Portal<JsonPersistence>, id: &str, output: &Output) -> Result<()> {
    let id = resolve_article_id(portal, id)?;
    let state = require_session(portal.toggle_like(&id)?)?;

    let likes = portal.store().get(&id).map_or(0, |a| a.likes());
    match state {
        LikeState::Liked => output.success(&format!("Liked ({} likes)", likes)),
        LikeState::Unliked => output.success(&format!("Like removed ({} likes)", likes)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use technova_core::{Config, Credentials, MockAuthenticator};
    use tempfile::TempDir;

    fn portal(temp_dir: &TempDir) -> Portal<JsonPersistence> {
        Portal::open_with_config(Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        })
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn args(title: &str) -> PublishArgs {
        PublishArgs {
            title: Some(title.to_string()),
            summary: Some("Summary".to_string()),
            body: Some("Body text".to_string()),
            body_file: None,
            category: Category::Gaming,
            image: None,
            tags: vec!["consoles".to_string()],
            hot: false,
            suggest_summary: false,
            suggest_title: false,
        }
    }

    #[tokio::test]
    async fn test_publish_requires_login() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = portal(&temp_dir);

        let err = publish(&mut portal, args("Title"), &quiet()).await.unwrap_err();
        assert!(err.to_string().contains("sign in"));
        assert_eq!(portal.store().len(), 3);
    }

    #[tokio::test]
    async fn test_publish_and_show() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = portal(&temp_dir);
        portal
            .login(&MockAuthenticator, &Credentials::login("a@b.c", "pw"))
            .unwrap();

        publish(&mut portal, args("New console"), &quiet()).await.unwrap();
        let article = portal.articles()[0].clone();
        assert_eq!(article.title, "New console");
        assert_eq!(article.category, Category::Gaming);
        assert_eq!(article.tags, vec!["consoles".to_string()]);

        show(&mut portal, article.id.as_str(), false, &quiet()).unwrap();
        show(&mut portal, article.id.as_str(), false, &quiet()).unwrap();
        assert_eq!(portal.articles()[0].views, 2);
    }

    #[tokio::test]
    async fn test_publish_blank_title_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = portal(&temp_dir);
        portal
            .login(&MockAuthenticator, &Credentials::login("a@b.c", "pw"))
            .unwrap();

        let err = publish(&mut portal, args("  "), &quiet()).await.unwrap_err();
        assert!(err.to_string().contains("title"));
        assert_eq!(portal.store().len(), 3);
    }

    #[test]
    fn test_like_toggles() {
        let temp_dir = TempDir::new().unwrap();
        let mut portal = portal(&temp_dir);
        assert!(like(&mut portal, "1", &quiet()).is_err());

        portal
            .login(&MockAuthenticator, &Credentials::login("a@b.c", "pw"))
            .unwrap();
        like(&mut portal, "1", &quiet()).unwrap();
        assert_eq!(portal.store().resolve("1").unwrap().likes(), 1);
        like(&mut portal, "1", &quiet()).unwrap();
        assert_eq!(portal.store().resolve("1").unwrap().likes(), 0);
    }
}
