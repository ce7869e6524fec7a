//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use technova_core::markup::{self, Block as MarkupBlock, Inline};
use technova_core::{Article, CategoryFilter, Portal, SnapshotStore};

use super::app::{ActivePane, App, InputMode};
use crate::output::truncate;

/// Main UI rendering function
pub fn draw<S: SnapshotStore>(frame: &mut Frame, app: &App, portal: &Portal<S>) {
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(35),
            Constraint::Percentage(45),
        ])
        .split(outer_chunks[0]);

    draw_categories_pane(frame, app, portal, pane_chunks[0]);
    draw_articles_pane(frame, app, portal, pane_chunks[1]);
    draw_detail_pane(frame, app, portal, pane_chunks[2]);

    draw_session_indicator(frame, portal);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[1]),
        InputMode::Search => draw_search_input(frame, app, outer_chunks[1]),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn pane_block(title: String, is_active: bool) -> Block<'static> {
    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn highlight_style(is_active: bool) -> Style {
    if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

/// Draw the category filter pane (left)
fn draw_categories_pane<S: SnapshotStore>(
    frame: &mut Frame,
    app: &App,
    portal: &Portal<S>,
    area: Rect,
) {
    let is_active = app.active_pane == ActivePane::Categories;

    let items: Vec<ListItem> = app
        .filters
        .iter()
        .map(|filter| {
            let count = portal
                .articles()
                .iter()
                .filter(|a| filter.matches(a.category))
                .count();
            let name = match filter {
                CategoryFilter::All => "All".to_string(),
                CategoryFilter::Only(category) => category.label().to_string(),
            };
            ListItem::new(Line::from(vec![
                Span::raw(name),
                Span::styled(
                    format!(" ({})", count),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(pane_block(" Categories ".to_string(), is_active))
        .highlight_style(highlight_style(is_active));

    let mut state = ListState::default();
    state.select(Some(app.filter_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the article list (middle)
fn draw_articles_pane<S: SnapshotStore>(
    frame: &mut Frame,
    app: &App,
    portal: &Portal<S>,
    area: Rect,
) {
    let is_active = app.active_pane == ActivePane::Articles;
    let max_len = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .article_ids
        .iter()
        .filter_map(|id| portal.store().get(id))
        .map(|article| {
            let marker = if article.is_hot { "🔥 " } else { "" };
            let title = Line::from(vec![
                Span::raw(marker),
                Span::raw(truncate(&article.title, max_len.saturating_sub(3))),
            ]);
            let meta = Line::from(vec![Span::styled(
                truncate(
                    &format!(
                        "{} · {} · {} views · {} likes",
                        article.category.label(),
                        article.date.format("%Y-%m-%d"),
                        article.views,
                        article.likes()
                    ),
                    max_len,
                ),
                Style::default().add_modifier(Modifier::DIM),
            )]);
            ListItem::new(vec![title, meta])
        })
        .collect();

    let mut title = format!(" {} ({}) ", app.mode, app.article_ids.len());
    if !app.search_input.is_empty() {
        title = format!(" {} ({}) /{} ", app.mode, app.article_ids.len(), app.search_input);
    }

    let list = List::new(items)
        .block(pane_block(title, is_active))
        .highlight_style(highlight_style(is_active));

    let mut state = ListState::default();
    if !app.article_ids.is_empty() {
        state.select(Some(app.article_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the detail pane (right)
fn draw_detail_pane<S: SnapshotStore>(
    frame: &mut Frame,
    app: &App,
    portal: &Portal<S>,
    area: Rect,
) {
    let is_active = app.active_pane == ActivePane::Detail;

    let (title, content) = match app.current_article(portal) {
        Some(article) if app.is_reading() => (" Reading ", article_lines(article, portal, area)),
        Some(article) => (" Preview ", preview_lines(article)),
        None => (
            " Detail ",
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No articles match",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ],
        ),
    };

    // Keep u16::MAX from 'G' within the content
    let max_scroll = u16::try_from(content.len()).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(content)
        .block(pane_block(title.to_string(), is_active))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll.min(max_scroll), 0));

    frame.render_widget(paragraph, area);
}

fn bold(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().add_modifier(Modifier::BOLD))
}

fn dim(text: String) -> Span<'static> {
    Span::styled(text, Style::default().add_modifier(Modifier::DIM))
}

fn header_lines(article: &Article) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            article.title.clone(),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        )),
        Line::from(dim(format!(
            "{} {} · {} · {} · {} min read",
            article.category.info().icon,
            article.category.label(),
            article.author,
            article.date.format("%Y-%m-%d"),
            article.read_time
        ))),
        Line::from(dim(format!(
            "{} views · {} likes · {} comments",
            article.views,
            article.likes(),
            article.comments.len()
        ))),
    ]
}

const PREVIEW_EXCERPT_CHARS: usize = 240;

/// Selected article before it is opened
fn preview_lines(article: &Article) -> Vec<Line<'static>> {
    let mut lines = header_lines(article);
    lines.push(Line::from(""));
    lines.push(Line::from(article.summary.clone()));
    if let Some(opening) = markup::excerpt(&article.body, PREVIEW_EXCERPT_CHARS) {
        lines.push(Line::from(""));
        lines.push(Line::from(dim(opening)));
    }
    if !article.tags.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![bold("Tags: "), Span::raw(article.tags.join(", "))]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(dim("Enter: read · L: like · o: open image".to_string())));
    lines
}

/// Full article with rendered body and comments
fn article_lines<S: SnapshotStore>(
    article: &Article,
    portal: &Portal<S>,
    area: Rect,
) -> Vec<Line<'static>> {
    let mut lines = header_lines(article);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        article.summary.clone(),
        Style::default().add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(""));
    lines.extend(markup_lines(&article.body));

    lines.push(Line::from(""));
    if article.comments.is_empty() {
        lines.push(Line::from(dim("── No comments ──".to_string())));
        return lines;
    }

    let header = format!("── Comments ({}) ", article.comments.len());
    let remaining = area
        .width
        .saturating_sub(header.chars().count() as u16 + 2) as usize;
    lines.push(Line::from(dim(format!("{}{}", header, "─".repeat(remaining)))));

    let user_id = portal.session().map(|u| u.id.as_str());
    for comment in &article.comments {
        let liked = user_id.is_some_and(|id| comment.reactions.is_liked_by(id));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            bold(&comment.author),
            dim(format!(
                "  {}  {}{}",
                comment.date.format("%Y-%m-%d %H:%M"),
                if liked { "♥ " } else { "♡ " },
                comment.reactions.likes()
            )),
        ]));
        for text_line in comment.text.lines() {
            lines.push(Line::from(format!("  {}", text_line)));
        }
    }
    lines
}

/// Render article markup as styled lines
pub fn markup_lines(body: &str) -> Vec<Line<'static>> {
    markup::render(body)
        .map(|block| match block {
            MarkupBlock::Heading { level: 1, text } => Line::from(Span::styled(
                text,
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::UNDERLINED),
            )),
            MarkupBlock::Heading { text, .. } => Line::from(bold(&text)),
            MarkupBlock::Quote(text) => Line::from(vec![
                Span::styled("│ ", Style::default().fg(Color::Cyan)),
                Span::styled(text, Style::default().add_modifier(Modifier::ITALIC)),
            ]),
            MarkupBlock::Image { alt, url } => Line::from(dim(match alt {
                Some(alt) => format!("[image: {}] {}", alt, url),
                None => format!("[image] {}", url),
            })),
            MarkupBlock::Paragraph(spans) => Line::from(inline_spans(spans, Style::default())),
        })
        .collect()
}

fn inline_spans(spans: Vec<Inline>, base: Style) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    for span in spans {
        match span {
            Inline::Text(text) => out.push(Span::styled(text, base)),
            Inline::Link { text, url } => {
                out.push(Span::styled(
                    text,
                    base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                ));
                out.push(Span::styled(
                    format!(" <{}>", url),
                    base.add_modifier(Modifier::DIM),
                ));
            }
            Inline::Strong(inner) => {
                out.extend(inline_spans(inner, base.add_modifier(Modifier::BOLD)));
            }
            Inline::Emphasis(inner) => {
                out.extend(inline_spans(inner, base.add_modifier(Modifier::ITALIC)));
            }
        }
    }
    out
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        "Enter:read  L:like  t:latest/trending  /:search  o:image  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw search input at the bottom
fn draw_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "/";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(app.search_input.as_str()),
        Span::styled(
            format!("  ({} matches)", app.article_ids.len()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = area.x + prefix.len() as u16 + app.search_cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw the signed-in user in the top-right corner
fn draw_session_indicator<S: SnapshotStore>(frame: &mut Frame, portal: &Portal<S>) {
    let area = frame.area();

    let (label, style) = match portal.session() {
        Some(user) => (
            format!(" {} ", user.username),
            Style::default().fg(Color::Green),
        ),
        None => (
            " signed out ".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    let width = label.chars().count() as u16;
    if area.width < width + 4 {
        return;
    }

    let indicator = Paragraph::new(Span::styled(label, style));
    let indicator_area = Rect::new(area.width - width - 2, 0, width, 1);
    frame.render_widget(indicator, indicator_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 22.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(bold("Keyboard Shortcuts")),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  gg          Jump to first item"),
        Line::from("  G           Jump to last item"),
        Line::from("  h/l, ←/→    Switch panes"),
        Line::from("  Tab         Cycle panes"),
        Line::from("  Enter       Read article / Apply category"),
        Line::from("  Esc         Close article"),
        Line::from(""),
        Line::from("Articles:"),
        Line::from("  t           Toggle Latest / Trending"),
        Line::from("  /           Search titles and text"),
        Line::from("  L           Like / unlike"),
        Line::from("  o           Open cover image"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from("Sign in with `technova login` to like."),
        Line::from(""),
        Line::from(dim("Press any key to close".to_string())),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}
