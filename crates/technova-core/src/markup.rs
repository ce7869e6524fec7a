//! Lightweight article markup
//!
//! Article bodies use a tiny line-oriented markup. Each input line becomes
//! exactly one [`Block`], decided independently of its neighbours:
//!
//! | line                | block                       |
//! |---------------------|-----------------------------|
//! | `# text`            | level 1 heading             |
//! | `## text`           | level 2 heading             |
//! | `> text`            | quote                       |
//! | `![alt](url)`       | image with optional caption |
//! | anything else       | paragraph of inline spans   |
//!
//! Inside paragraphs, `[text](url)` links are recognised first, then
//! `**strong**`, then `_emphasis_`. The result is a tree of typed nodes; text
//! is never spliced into markup. URLs are checked against an allow-list and a
//! link or image with any other scheme degrades to plain text.

use std::fmt::Write as _;
use std::str::Lines;
use std::sync::LazyLock;

use regex::Regex;

/// Rendered in place of an empty line so paragraph spacing survives
pub const BLANK_LINE: &str = "\u{00A0}";

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)\s]+)\)$").expect("valid image pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid link pattern"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid strong pattern"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_]+)_").expect("valid emphasis pattern"));

/// One display block, produced from one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Quote(String),
    Image { alt: Option<String>, url: String },
    Paragraph(Vec<Inline>),
}

/// Inline span inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { text: String, url: String },
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
}

/// Lazy iterator over the blocks of a body
///
/// Clones advance independently, so cloning before consuming (or calling
/// [`render`] again) walks the body a second time.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    lines: Lines<'a>,
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        self.lines.next().map(parse_line)
    }
}

/// Render a body into display blocks, one per line
pub fn render(body: &str) -> Blocks<'_> {
    Blocks {
        lines: body.lines(),
    }
}

/// Classify a single line
pub fn parse_line(line: &str) -> Block {
    if let Some(text) = line.strip_prefix("# ") {
        return Block::Heading {
            level: 1,
            text: text.to_string(),
        };
    }
    if let Some(text) = line.strip_prefix("## ") {
        return Block::Heading {
            level: 2,
            text: text.to_string(),
        };
    }
    if let Some(text) = line.strip_prefix("> ") {
        return Block::Quote(text.to_string());
    }
    if let Some(caps) = IMAGE.captures(line.trim()) {
        let alt = caps[1].trim();
        let url = &caps[2];
        if is_safe_image_url(url) {
            return Block::Image {
                alt: (!alt.is_empty()).then(|| alt.to_string()),
                url: url.to_string(),
            };
        }
        let text = if alt.is_empty() { BLANK_LINE } else { alt };
        return Block::Paragraph(vec![Inline::Text(text.to_string())]);
    }

    if line.trim().is_empty() {
        return Block::Paragraph(vec![Inline::Text(BLANK_LINE.to_string())]);
    }
    Block::Paragraph(parse_inlines(line))
}

/// Parse the inline spans of a paragraph line
///
/// Each pass runs over the whole line. Nodes built by an earlier pass are
/// opaque to later ones, so a `**`/`_` pair may wrap a link but never splits
/// one, and underscores inside a link URL are left alone.
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    let linked = parse_links(text);
    let strong = pair_markers(linked, "**", Inline::Strong);
    emphasise(strong)
}

fn parse_links(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in LINK.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut spans, &text[last..whole.start()]);

        let label = &caps[1];
        let url = &caps[2];
        if is_safe_link_url(url) {
            spans.push(Inline::Link {
                text: label.to_string(),
                url: url.to_string(),
            });
        } else {
            push_text(&mut spans, label);
        }
        last = whole.end();
    }
    push_text(&mut spans, &text[last..]);

    spans
}

/// Emphasis applies inside strong spans as well as between them
fn emphasise(spans: Vec<Inline>) -> Vec<Inline> {
    let spans = spans
        .into_iter()
        .map(|span| match span {
            Inline::Strong(inner) => Inline::Strong(emphasise(inner)),
            other => other,
        })
        .collect();
    pair_markers(spans, "_", Inline::Emphasis)
}

enum Piece {
    Marker,
    Span(Inline),
}

/// Wrap everything between consecutive `marker`s in the text spans with
/// `wrap`. Pairs with nothing between them stay literal, as does an unpaired
/// trailing marker.
fn pair_markers(spans: Vec<Inline>, marker: &str, wrap: fn(Vec<Inline>) -> Inline) -> Vec<Inline> {
    let mut pieces = Vec::new();
    for span in spans {
        match span {
            Inline::Text(text) => {
                for (i, part) in text.split(marker).enumerate() {
                    if i > 0 {
                        pieces.push(Piece::Marker);
                    }
                    pieces.push(Piece::Span(Inline::Text(part.to_string())));
                }
            }
            other => pieces.push(Piece::Span(other)),
        }
    }

    let mut out = Vec::new();
    let mut open: Option<Vec<Inline>> = None;
    for piece in pieces {
        match piece {
            Piece::Span(span) => push_span(open.as_mut().unwrap_or(&mut out), span),
            Piece::Marker => match open.take() {
                None => open = Some(Vec::new()),
                Some(inner) if inner.is_empty() => {
                    push_text(&mut out, marker);
                    open = Some(inner);
                }
                Some(inner) => out.push(wrap(inner)),
            },
        }
    }
    if let Some(inner) = open {
        push_text(&mut out, marker);
        inner.into_iter().for_each(|span| push_span(&mut out, span));
    }

    out
}

fn push_span(spans: &mut Vec<Inline>, span: Inline) {
    match span {
        Inline::Text(text) => push_text(spans, &text),
        other => spans.push(other),
    }
}

/// Append text, merging with a preceding text span
fn push_text(spans: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(previous)) = spans.last_mut() {
        previous.push_str(text);
    } else {
        spans.push(Inline::Text(text.to_string()));
    }
}

fn is_safe_link_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || lower.starts_with('#')
        || (lower.starts_with('/') && !lower.starts_with("//"))
}

fn is_safe_image_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://")
        || lower.starts_with("http://")
        || (lower.starts_with('/') && !lower.starts_with("//"))
}

/// Concatenate the visible text of a list of spans
pub fn plain_text(spans: &[Inline]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text(text) | Inline::Link { text, .. } => out.push_str(text),
            Inline::Strong(inner) | Inline::Emphasis(inner) => out.push_str(&plain_text(inner)),
        }
    }
    out
}

/// Visible text of the first non-blank paragraph, cut to `max_chars`
pub fn excerpt(body: &str, max_chars: usize) -> Option<String> {
    let text = render(body).find_map(|block| match block {
        Block::Paragraph(spans) => {
            let text = plain_text(&spans);
            let text = text.trim();
            (!text.is_empty() && text != BLANK_LINE).then(|| text.to_string())
        }
        _ => None,
    })?;

    if text.chars().count() <= max_chars {
        return Some(text);
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    Some(format!("{}…", cut.trim_end()))
}

/// Serialize blocks to HTML, escaping all text and attribute values
pub fn to_html<I>(blocks: I) -> String
where
    I: IntoIterator<Item = Block>,
{
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let _ = writeln!(html, "<h{level}>{}</h{level}>", escape(&text));
            }
            Block::Quote(text) => {
                let _ = writeln!(html, "<blockquote>{}</blockquote>", escape(&text));
            }
            Block::Image { alt, url } => {
                let alt = alt.unwrap_or_default();
                html.push_str("<figure>");
                let _ = write!(html, "<img src=\"{}\" alt=\"{}\">", escape(&url), escape(&alt));
                if !alt.is_empty() {
                    let _ = write!(html, "<figcaption>{}</figcaption>", escape(&alt));
                }
                html.push_str("</figure>\n");
            }
            Block::Paragraph(spans) => {
                html.push_str("<p>");
                write_inlines(&mut html, &spans);
                html.push_str("</p>\n");
            }
        }
    }
    html
}

fn write_inlines(html: &mut String, spans: &[Inline]) {
    for span in spans {
        match span {
            Inline::Text(text) if text == BLANK_LINE => html.push_str("&nbsp;"),
            Inline::Text(text) => html.push_str(&escape(text)),
            Inline::Link { text, url } => {
                let _ = write!(
                    html,
                    "<a href=\"{}\" rel=\"noopener noreferrer\">{}</a>",
                    escape(url),
                    escape(text)
                );
            }
            Inline::Strong(inner) => {
                html.push_str("<strong>");
                write_inlines(html, inner);
                html.push_str("</strong>");
            }
            Inline::Emphasis(inner) => {
                html.push_str("<em>");
                write_inlines(html, inner);
                html.push_str("</em>");
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
