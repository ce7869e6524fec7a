//! TechNova TUI
//!
//! Terminal user interface for reading the news feed.
//!
//! ## Layout
//!
//! - Left: Categories (All, AI, Web, ...)
//! - Middle: Articles in the current view (Latest or Trending)
//! - Right: Preview of the selected article, or the full article once opened
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down (scrolls the article when reading)
//! - h/l, ←/→, Tab, Shift-Tab: Focus the neighbouring pane
//! - Enter: Apply category / Open article (counts a view)
//! - Esc: Close article
//! - q: Quit
//!
//! ## Commands
//!
//! - t: Toggle Latest/Trending
//! - /: Search
//! - L: Like or unlike
//! - o: Open cover image in the browser

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use technova_core::{Config, JsonPersistence, Portal};

use app::{App, InputMode};

/// Open the reader on the configured data directory
pub async fn run(config: Config) -> Result<()> {
    init_tui_logging(&config);

    let mut portal = Portal::open_with_config(config);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(&portal);

    let result = run_app(&mut terminal, &mut app, &mut portal).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    portal: &mut Portal<JsonPersistence>,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app, portal))?;

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Non-blocking
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Any key closes help
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                match app.input_mode {
                    InputMode::Normal => handle_normal_mode(app, portal, key.code, key.modifiers),
                    InputMode::Search => handle_search_mode(app, portal, key.code),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_normal_mode(
    app: &mut App,
    portal: &mut Portal<JsonPersistence>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    // Moving around clears the last status message
    if matches!(
        code,
        KeyCode::Char('j' | 'k' | 'h' | 'l' | 'g' | 'G')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
    ) {
        app.status_message = None;
    }

    app.expire_pending_g();

    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.should_quit = true,

        KeyCode::Char('k') | KeyCode::Up => app.move_up(portal),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(portal),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => app.prev_pane(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => app.next_pane(),

        KeyCode::Enter => {
            if let Err(e) = app.handle_enter(portal) {
                warn!(error = %e, "failed to open article");
                app.set_status(format!("Failed to save: {}", e));
            }
        }
        KeyCode::Esc => app.close_article(),

        KeyCode::Char('t') => app.toggle_mode(portal),
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Char('L') => {
            if let Err(e) = app.like_current(portal) {
                warn!(error = %e, "failed to save like");
                app.set_status(format!("Failed to save: {}", e));
            }
        }
        KeyCode::Char('o') => {
            if let Some(url) = app.current_image_url(portal) {
                match open::that_detached(&url) {
                    Ok(()) => app.set_status(format!("Opened {}", url)),
                    Err(e) => app.set_status(format!("Failed to open: {}", e)),
                }
            }
        }
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('G') => {
            app.pending_g = None;
            app.move_to_last(portal);
        }
        KeyCode::Char('g') => {
            if app.pending_g.take().is_some() {
                app.move_to_first(portal);
            } else {
                app.pending_g = Some(std::time::Instant::now());
            }
        }

        _ => {
            app.pending_g = None;
        }
    }
}

/// Typing edits the query and refilters the list
fn handle_search_mode(app: &mut App, portal: &Portal<JsonPersistence>, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_search(portal),
        KeyCode::Enter => app.confirm_search(),
        KeyCode::Char(c) => app.insert_char(c, portal),
        KeyCode::Backspace => app.delete_char(portal),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        _ => {}
    }
}

/// The screen is owned by the UI, so logs go to `config.log_path()`, and only
/// when `TECHNOVA_LOG` names a level.
fn init_tui_logging(config: &Config) {
    let Ok(level) = std::env::var("TECHNOVA_LOG") else {
        return;
    };

    let path = config.log_path();
    let writer = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: logging disabled, cannot create {:?}: {}", path, e);
            return;
        }
    };

    let filter = EnvFilter::new(format!("technova_core={level},technova_cli={level}"));
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .is_ok();

    if initialized {
        info!(path = %path.display(), "reader logging enabled");
    }
}
