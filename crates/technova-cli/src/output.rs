//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use technova_core::markup::{self, Block, Inline};
use technova_core::{Article, Category, Comment, Podcast, User};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode JSON: {}", e),
        }
    }

    /// Print a full article with its rendered body and comments
    pub fn print_article(&self, article: &Article) {
        match self.format {
            OutputFormat::Human => {
                println!("{}", article.title);
                println!("{}", "=".repeat(article.title.chars().count().min(72)));
                println!(
                    "{} | {} | {} | {} min read",
                    article.category.label(),
                    article.author,
                    article.date.format("%Y-%m-%d"),
                    article.read_time
                );
                println!(
                    "{} views | {} likes | {} comments{}",
                    article.views,
                    article.likes(),
                    article.comments.len(),
                    if article.is_hot { " | HOT" } else { "" }
                );
                if !article.tags.is_empty() {
                    println!("Tags: {}", article.tags.join(", "));
                }
                println!("ID:   {}", article.id);
                println!();
                println!("{}", article.summary);
                println!();
                for line in render_body(&article.body) {
                    println!("{}", line);
                }

                if !article.comments.is_empty() {
                    println!();
                    println!("── Comments ({}) ──", article.comments.len());
                    for comment in &article.comments {
                        print_comment_line(comment);
                    }
                }
            }
            OutputFormat::Json => self.json(article),
            OutputFormat::Quiet => println!("{}", article.id),
        }
    }

    /// Print a list of articles
    pub fn print_articles(&self, articles: &[&Article]) {
        match self.format {
            OutputFormat::Human => {
                if articles.is_empty() {
                    println!("No articles found.");
                    return;
                }
                for article in articles {
                    println!(
                        "{} | {:<8} | {} | {:>6} views {:>4} likes | {}",
                        short_id(article.id.as_str()),
                        article.category.label(),
                        article.date.format("%Y-%m-%d"),
                        article.views,
                        article.likes(),
                        truncate(&article.title, 45)
                    );
                }
                println!("\n{} article(s)", articles.len());
            }
            OutputFormat::Json => self.json(articles),
            OutputFormat::Quiet => {
                for article in articles {
                    println!("{}", article.id);
                }
            }
        }
    }

    /// Print the comments on an article
    pub fn print_comments(&self, article: &Article) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "Comments on: {} - {}",
                    short_id(article.id.as_str()),
                    article.title
                );
                println!();

                if article.comments.is_empty() {
                    println!("No comments yet.");
                    return;
                }

                for comment in &article.comments {
                    print_comment_line(comment);
                }
                println!("\n{} comment(s)", article.comments.len());
            }
            OutputFormat::Json => self.json(&article.comments),
            OutputFormat::Quiet => {
                for comment in &article.comments {
                    println!("{}", comment.id);
                }
            }
        }
    }

    /// Print the category taxonomy with article counts
    pub fn print_categories(&self, counts: &[(Category, usize)]) {
        match self.format {
            OutputFormat::Human => {
                for (category, count) in counts {
                    println!("{:<10} {:<18} ({})", category.label(), category.info().icon, count);
                }
            }
            OutputFormat::Json => {
                let json: Vec<_> = counts
                    .iter()
                    .map(|(category, count)| {
                        serde_json::json!({
                            "id": category.id(),
                            "label": category.label(),
                            "icon": category.info().icon,
                            "articles": count
                        })
                    })
                    .collect();
                self.json(&json);
            }
            OutputFormat::Quiet => {
                for (category, _) in counts {
                    println!("{}", category.id());
                }
            }
        }
    }

    /// Print podcast episodes
    pub fn print_podcasts(&self, podcasts: &[Podcast]) {
        match self.format {
            OutputFormat::Human => {
                for podcast in podcasts {
                    println!(
                        "{} | {} | {} | {}",
                        podcast.date.format("%Y-%m-%d"),
                        podcast.duration,
                        podcast.host,
                        podcast.title
                    );
                }
            }
            OutputFormat::Json => self.json(podcasts),
            OutputFormat::Quiet => {
                for podcast in podcasts {
                    println!("{}", podcast.id);
                }
            }
        }
    }

    /// Print the signed-in user, or a hint when nobody is
    pub fn print_user(&self, user: Option<&User>) {
        match (self.format, user) {
            (OutputFormat::Human, Some(user)) => {
                println!("Signed in as {} <{}>", user.username, user.email);
                println!("Avatar: {}", user.avatar);
            }
            (OutputFormat::Human, None) => {
                println!("Not signed in. Use `technova login` to sign in.");
            }
            (OutputFormat::Json, user) => self.json(&user),
            (OutputFormat::Quiet, Some(user)) => println!("{}", user.username),
            (OutputFormat::Quiet, None) => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_comment_line(comment: &Comment) {
    println!(
        "[{}] {} {} ({} likes)",
        short_id(comment.id.as_str()),
        comment.date.format("%Y-%m-%d %H:%M"),
        comment.author,
        comment.reactions.likes()
    );
    println!("  {}", comment.text);
}

/// Render an article body as plain terminal lines
pub fn render_body(body: &str) -> Vec<String> {
    markup::render(body)
        .map(|block| match block {
            Block::Heading { level: 1, text } => text.to_uppercase(),
            Block::Heading { text, .. } => format!("{}\n{}", text, "-".repeat(text.chars().count())),
            Block::Quote(text) => format!("│ {}", text),
            Block::Image { alt, url } => match alt {
                Some(alt) => format!("[image: {}] {}", alt, url),
                None => format!("[image] {}", url),
            },
            Block::Paragraph(spans) => render_spans(&spans),
        })
        .collect()
}

fn render_spans(spans: &[Inline]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text(text) => out.push_str(text),
            Inline::Link { text, url } => {
                out.push_str(text);
                out.push_str(" <");
                out.push_str(url);
                out.push('>');
            }
            Inline::Strong(inner) => {
                out.push('*');
                out.push_str(&render_spans(inner));
                out.push('*');
            }
            Inline::Emphasis(inner) => {
                out.push('_');
                out.push_str(&render_spans(inner));
                out.push('_');
            }
        }
    }
    out
}

/// First eight characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are never split
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("1"), "1");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
    }

    #[test]
    fn test_render_body() {
        let lines = render_body("# Big\n## Small\n> said\nsee [docs](https://docs.rs) **now**\n\n![chart](https://x.io/c.png)");
        assert_eq!(lines[0], "BIG");
        assert_eq!(lines[1], "Small\n-----");
        assert_eq!(lines[2], "│ said");
        assert_eq!(lines[3], "see docs <https://docs.rs> *now*");
        assert_eq!(lines[4], markup::BLANK_LINE);
        assert_eq!(lines[5], "[image: chart] https://x.io/c.png");
    }
}
