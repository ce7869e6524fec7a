//! Application state and logic

use std::time::{Duration, Instant};

use technova_core::{
    Article, ArticleId, Category, CategoryFilter, LikeState, Outcome, Portal, SnapshotStore,
    ViewMode, ViewQuery,
};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Time allowed between the two keys of `gg`
const PENDING_G_TIMEOUT: Duration = Duration::from_millis(500);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Search input (after pressing /)
    Search,
}

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Categories,
    Articles,
    Detail,
}

impl ActivePane {
    /// Move to the next pane (wrapping)
    pub fn next(self) -> Self {
        match self {
            ActivePane::Categories => ActivePane::Articles,
            ActivePane::Articles => ActivePane::Detail,
            ActivePane::Detail => ActivePane::Categories,
        }
    }

    /// Move to the previous pane (wrapping)
    pub fn prev(self) -> Self {
        match self {
            ActivePane::Categories => ActivePane::Detail,
            ActivePane::Articles => ActivePane::Categories,
            ActivePane::Detail => ActivePane::Articles,
        }
    }
}

/// Application state
///
/// The app holds only ids and view settings; article data is always read
/// from the portal so the screen never shows a stale copy.
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Search input buffer
    pub search_input: String,
    /// Cursor position in the search input, in characters
    pub search_cursor: usize,
    /// Search text in effect before the current edit, restored on Esc
    saved_search: String,
    /// Which pane has focus
    pub active_pane: ActivePane,
    /// Category filters in the left pane: All, then every category
    pub filters: Vec<CategoryFilter>,
    /// Currently selected filter index
    pub filter_index: usize,
    /// Latest or Trending ordering
    pub mode: ViewMode,
    /// Ids of the articles in the current view, in display order
    pub article_ids: Vec<ArticleId>,
    /// Currently selected article index
    pub article_index: usize,
    /// Article opened for reading, if any
    pub opened: Option<ArticleId>,
    /// Scroll offset for detail pane
    pub detail_scroll: u16,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Pending 'g' keypress for gg sequence (with timestamp)
    pub pending_g: Option<Instant>,
}

impl App {
    /// Create the app showing the Latest view of every category
    pub fn new<S: SnapshotStore>(portal: &Portal<S>) -> Self {
        let filters = std::iter::once(CategoryFilter::All)
            .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
            .collect();

        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_cursor: 0,
            saved_search: String::new(),
            active_pane: ActivePane::Articles,
            filters,
            filter_index: 0,
            mode: ViewMode::Latest,
            article_ids: Vec::new(),
            article_index: 0,
            opened: None,
            detail_scroll: 0,
            status_message: None,
            status_message_time: None,
            show_help: false,
            pending_g: None,
        };
        app.refresh(portal);
        app
    }

    /// The query behind the article list
    pub fn query(&self) -> ViewQuery {
        ViewQuery::new()
            .with_category(self.current_filter())
            .with_search(self.search_input.clone())
            .with_mode(self.mode)
    }

    /// Get the currently selected category filter
    pub fn current_filter(&self) -> CategoryFilter {
        self.filters
            .get(self.filter_index)
            .copied()
            .unwrap_or_default()
    }

    /// Recompute the article list, keeping the selected article when it is still visible
    pub fn refresh<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        let selected = self.article_ids.get(self.article_index).cloned();

        self.article_ids = portal
            .view(&self.query())
            .into_iter()
            .map(|a| a.id.clone())
            .collect();

        self.article_index = selected
            .and_then(|id| self.article_ids.iter().position(|a| *a == id))
            .unwrap_or(0);
    }

    /// Get the currently selected article
    pub fn current_article<'a, S: SnapshotStore>(
        &self,
        portal: &'a Portal<S>,
    ) -> Option<&'a Article> {
        let id = self.article_ids.get(self.article_index)?;
        portal.store().get(id)
    }

    /// Whether the selected article is open for reading
    pub fn is_reading(&self) -> bool {
        self.opened.is_some() && self.opened.as_ref() == self.article_ids.get(self.article_index)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Drop a pending `g` that was not followed in time
    pub fn expire_pending_g(&mut self) {
        if let Some(time) = self.pending_g {
            if time.elapsed() > PENDING_G_TIMEOUT {
                self.pending_g = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Move selection up in the current pane
    pub fn move_up<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        match self.active_pane {
            ActivePane::Categories => {
                if self.filter_index > 0 {
                    self.filter_index -= 1;
                    self.refresh(portal);
                }
            }
            ActivePane::Articles => {
                if self.article_index > 0 {
                    self.article_index -= 1;
                    self.detail_scroll = 0;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
        }
    }

    /// Move selection down in the current pane
    pub fn move_down<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        match self.active_pane {
            ActivePane::Categories => {
                if self.filter_index < self.filters.len().saturating_sub(1) {
                    self.filter_index += 1;
                    self.refresh(portal);
                }
            }
            ActivePane::Articles => {
                if self.article_index < self.article_ids.len().saturating_sub(1) {
                    self.article_index += 1;
                    self.detail_scroll = 0;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
        }
    }

    /// Move selection to first item in the current pane (vim 'gg')
    pub fn move_to_first<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        match self.active_pane {
            ActivePane::Categories => {
                self.filter_index = 0;
                self.refresh(portal);
            }
            ActivePane::Articles => {
                self.article_index = 0;
                self.detail_scroll = 0;
            }
            ActivePane::Detail => {
                self.detail_scroll = 0;
            }
        }
    }

    /// Move selection to last item in the current pane (vim 'G')
    pub fn move_to_last<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        match self.active_pane {
            ActivePane::Categories => {
                self.filter_index = self.filters.len().saturating_sub(1);
                self.refresh(portal);
            }
            ActivePane::Articles => {
                self.article_index = self.article_ids.len().saturating_sub(1);
                self.detail_scroll = 0;
            }
            ActivePane::Detail => {
                // Clamped by the renderer
                self.detail_scroll = u16::MAX;
            }
        }
    }

    /// Move focus to the next pane
    pub fn next_pane(&mut self) {
        self.active_pane = self.active_pane.next();
    }

    /// Move focus to the previous pane
    pub fn prev_pane(&mut self) {
        self.active_pane = self.active_pane.prev();
    }

    /// Handle Enter key in current pane
    pub fn handle_enter<S: SnapshotStore>(&mut self, portal: &mut Portal<S>) -> anyhow::Result<()> {
        match self.active_pane {
            ActivePane::Categories => {
                self.refresh(portal);
                self.active_pane = ActivePane::Articles;
            }
            // Already reading: no second view
            ActivePane::Detail if self.is_reading() => {}
            ActivePane::Articles | ActivePane::Detail => self.open_current(portal)?,
        }
        Ok(())
    }

    /// Open the selected article for reading; counts one view
    pub fn open_current<S: SnapshotStore>(&mut self, portal: &mut Portal<S>) -> anyhow::Result<()> {
        let Some(id) = self.article_ids.get(self.article_index).cloned() else {
            return Ok(());
        };

        portal.record_view(&id)?;
        self.opened = Some(id);
        self.detail_scroll = 0;
        self.active_pane = ActivePane::Detail;
        // Views change the Trending order
        self.refresh(portal);
        Ok(())
    }

    /// Close the article being read
    pub fn close_article(&mut self) {
        if self.opened.take().is_some() {
            self.detail_scroll = 0;
            self.active_pane = ActivePane::Articles;
        }
    }

    /// Switch between Latest and Trending ordering
    pub fn toggle_mode<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        self.mode = self.mode.toggle();
        self.refresh(portal);
        self.set_status(format!("Showing {}", self.mode));
    }

    /// Like or unlike the selected article
    pub fn like_current<S: SnapshotStore>(&mut self, portal: &mut Portal<S>) -> anyhow::Result<()> {
        let Some(id) = self.article_ids.get(self.article_index).cloned() else {
            return Ok(());
        };

        match portal.toggle_like(&id)? {
            Outcome::Applied(LikeState::Liked) => self.set_status("Liked"),
            Outcome::Applied(LikeState::Unliked) => self.set_status("Like removed"),
            Outcome::AuthRequired => {
                self.set_status("Sign in with `technova login` to like articles")
            }
        }
        self.refresh(portal);
        Ok(())
    }

    /// Cover image URL of the selected article
    pub fn current_image_url<S: SnapshotStore>(&self, portal: &Portal<S>) -> Option<String> {
        self.current_article(portal).map(|a| a.image_url.clone())
    }

    /// Enter search mode, editing the current search text
    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
        self.saved_search = self.search_input.clone();
        self.search_cursor = self.search_input.chars().count();
    }

    /// Keep the typed search and return to normal mode
    pub fn confirm_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.active_pane = ActivePane::Articles;
    }

    /// Restore the previous search and return to normal mode
    pub fn cancel_search<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        self.search_input = std::mem::take(&mut self.saved_search);
        self.search_cursor = self.search_input.chars().count();
        self.input_mode = InputMode::Normal;
        self.refresh(portal);
    }

    /// Insert character at cursor position; the list follows as you type
    pub fn insert_char<S: SnapshotStore>(&mut self, c: char, portal: &Portal<S>) {
        let at = byte_index(&self.search_input, self.search_cursor);
        self.search_input.insert(at, c);
        self.search_cursor += 1;
        self.refresh(portal);
    }

    /// Delete character before cursor
    pub fn delete_char<S: SnapshotStore>(&mut self, portal: &Portal<S>) {
        if self.search_cursor > 0 {
            self.search_cursor -= 1;
            let at = byte_index(&self.search_input, self.search_cursor);
            self.search_input.remove(at);
            self.refresh(portal);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.search_cursor = self.search_cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.search_cursor < self.search_input.chars().count() {
            self.search_cursor += 1;
        }
    }
}

/// Byte offset of the character at `char_index`, or the end of the string
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use technova_core::{Credentials, MemoryPersistence, MockAuthenticator};

    fn portal() -> Portal<MemoryPersistence> {
        Portal::new(MemoryPersistence::new())
    }

    fn ids(app: &App) -> Vec<&str> {
        app.article_ids.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_active_pane_next() {
        assert_eq!(ActivePane::Categories.next(), ActivePane::Articles);
        assert_eq!(ActivePane::Articles.next(), ActivePane::Detail);
        assert_eq!(ActivePane::Detail.next(), ActivePane::Categories);
    }

    #[test]
    fn test_active_pane_prev() {
        assert_eq!(ActivePane::Categories.prev(), ActivePane::Detail);
        assert_eq!(ActivePane::Articles.prev(), ActivePane::Categories);
        assert_eq!(ActivePane::Detail.prev(), ActivePane::Articles);
    }

    #[test]
    fn test_new_app_shows_latest_first() {
        let portal = portal();
        let app = App::new(&portal);

        assert_eq!(app.filters.len(), 1 + Category::ALL.len());
        assert_eq!(app.current_filter(), CategoryFilter::All);
        assert_eq!(ids(&app), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_category_pane_filters_list() {
        let portal = portal();
        let mut app = App::new(&portal);
        app.active_pane = ActivePane::Categories;

        // All -> AI
        app.move_down(&portal);
        assert_eq!(app.current_filter(), CategoryFilter::Only(Category::Ai));
        assert_eq!(ids(&app), vec!["1"]);

        app.move_to_first(&portal);
        assert_eq!(ids(&app).len(), 3);
    }

    #[test]
    fn test_toggle_mode_keeps_selection() {
        let portal = portal();
        let mut app = App::new(&portal);
        app.article_index = 1; // "3"

        app.toggle_mode(&portal);
        assert_eq!(app.mode, ViewMode::Trending);
        assert_eq!(ids(&app), vec!["2", "1", "3"]);
        assert_eq!(app.article_ids[app.article_index].as_str(), "3");
    }

    #[test]
    fn test_open_records_view() {
        let mut portal = portal();
        let mut app = App::new(&portal);
        let before = portal.store().resolve("1").unwrap().views;

        app.handle_enter(&mut portal).unwrap();
        assert!(app.is_reading());
        assert_eq!(app.active_pane, ActivePane::Detail);
        assert_eq!(portal.store().resolve("1").unwrap().views, before + 1);

        app.close_article();
        assert!(!app.is_reading());
        assert_eq!(app.active_pane, ActivePane::Articles);
    }

    #[test]
    fn test_enter_while_reading_counts_no_extra_view() {
        let mut portal = portal();
        let mut app = App::new(&portal);
        let before = portal.store().resolve("1").unwrap().views;

        app.handle_enter(&mut portal).unwrap();
        app.detail_scroll = 4;
        app.handle_enter(&mut portal).unwrap();
        app.handle_enter(&mut portal).unwrap();

        assert!(app.is_reading());
        assert_eq!(app.detail_scroll, 4);
        assert_eq!(portal.store().resolve("1").unwrap().views, before + 1);
    }

    #[test]
    fn test_like_without_session_shows_hint() {
        let mut portal = portal();
        let mut app = App::new(&portal);

        app.like_current(&mut portal).unwrap();
        assert_eq!(portal.store().resolve("1").unwrap().likes(), 0);
        assert!(app.status_message.as_deref().unwrap().contains("technova login"));
    }

    #[test]
    fn test_like_with_session() {
        let mut portal = portal();
        portal
            .login(&MockAuthenticator, &Credentials::login("a@b.c", "pw"))
            .unwrap();
        let mut app = App::new(&portal);

        app.like_current(&mut portal).unwrap();
        assert_eq!(portal.store().resolve("1").unwrap().likes(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Liked"));
    }

    #[test]
    fn test_search_as_you_type_and_cancel() {
        let portal = portal();
        let mut app = App::new(&portal);

        app.enter_search_mode();
        for c in "REACT".chars() {
            app.insert_char(c, &portal);
        }
        assert_eq!(ids(&app), vec!["2"]);

        app.delete_char(&portal);
        assert_eq!(app.search_input, "REAC");

        app.cancel_search(&portal);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.search_input.is_empty());
        assert_eq!(ids(&app).len(), 3);
    }

    #[test]
    fn test_search_cursor_handles_multibyte() {
        let portal = portal();
        let mut app = App::new(&portal);

        app.enter_search_mode();
        app.insert_char('é', &portal);
        app.insert_char('x', &portal);
        app.cursor_left();
        app.insert_char('ü', &portal);
        assert_eq!(app.search_input, "éüx");
        app.delete_char(&portal);
        assert_eq!(app.search_input, "éx");
    }

    #[test]
    fn test_search_without_matches_empties_list() {
        let portal = portal();
        let mut app = App::new(&portal);

        app.enter_search_mode();
        app.insert_char('§', &portal);
        assert!(app.article_ids.is_empty());
        assert!(app.current_article(&portal).is_none());
        app.move_down(&portal);
        assert_eq!(app.article_index, 0);
    }
}
