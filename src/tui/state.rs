//! Application state management and input handling.

use crate::api::{HomeFeed, Section};
use crate::config::Keybindings;
use crate::media;
use crate::paging::{EpisodePager, PAGE_BUTTON_WINDOW};
use crate::types::{Drama, Episode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use super::types::{Action, Focus, Screen};

/// Episode numbers per row in the episode grid.
pub const GRID_COLUMNS: usize = 10;

/// Application state for the TUI.
pub struct App {
    /// Current screen being displayed
    pub screen: Screen,
    /// Current focus (sidebar or main)
    pub focus: Focus,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Current search query being typed
    pub search_input: String,
    /// Whether search bar is focused
    pub search_focused: bool,
    /// Screen to return to when the search is cancelled
    pub search_origin: Screen,
    /// Home feed sections
    pub feed: HomeFeed,
    /// Sidebar section selection
    pub section_list_state: ListState,
    /// Drama selection within the current section
    pub feed_list_state: ListState,
    /// Popular search terms
    pub popular_searches: Vec<String>,
    pub popular_list_state: ListState,
    /// Query of the last search
    pub search_query: String,
    /// Search results
    pub search_results: Vec<Drama>,
    pub results_list_state: ListState,
    /// Screen the results page returns to
    pub results_origin: Screen,
    /// Drama on the detail/watch screens
    pub drama: Option<Drama>,
    /// Screen the detail page was opened from
    pub detail_origin: Screen,
    /// Episodes of the open drama, sorted by index
    pub episodes: Vec<Episode>,
    /// Episode being watched (1-based)
    pub current_episode: usize,
    /// Highlighted cell in the episode grid (1-based)
    pub cursor_episode: usize,
    /// Episode grid pages
    pub pager: EpisodePager,
    /// Episodes per grid page
    pub page_size: usize,
    /// Selected video quality
    pub quality: u32,
    pub quality_list_state: ListState,
    /// Whether the player failed for the current episode/quality
    pub video_error: bool,
    /// Loading message
    pub loading_message: String,
    /// Screen shown again when loading is cancelled
    pub loading_return: Screen,
    /// Status message to display
    pub status_message: Option<String>,
    /// Error message to display
    pub error_message: Option<String>,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Custom keybindings
    pub keybindings: Keybindings,
}

fn select_prev(state: &mut ListState) {
    let i = state.selected().unwrap_or(0);
    if i > 0 {
        state.select(Some(i - 1));
    }
}

fn select_next(state: &mut ListState, len: usize) {
    match state.selected() {
        Some(i) if i + 1 < len => state.select(Some(i + 1)),
        None if len > 0 => state.select(Some(0)),
        _ => {}
    }
}

fn select_first(state: &mut ListState, len: usize) {
    state.select(if len > 0 { Some(0) } else { None });
}

impl App {
    /// Create a new App with default state.
    pub fn new(quality: u32, page_size: usize, keybindings: Keybindings) -> Self {
        let mut section_state = ListState::default();
        section_state.select(Some(0));

        Self {
            screen: Screen::Home,
            focus: Focus::Main,
            should_quit: false,
            search_input: String::new(),
            search_focused: false,
            search_origin: Screen::Home,
            feed: HomeFeed::default(),
            section_list_state: section_state,
            feed_list_state: ListState::default(),
            popular_searches: Vec::new(),
            popular_list_state: ListState::default(),
            search_query: String::new(),
            search_results: Vec::new(),
            results_list_state: ListState::default(),
            results_origin: Screen::Home,
            drama: None,
            detail_origin: Screen::Home,
            episodes: Vec::new(),
            current_episode: 1,
            cursor_episode: 1,
            pager: EpisodePager::new(0, page_size),
            page_size: page_size.max(1),
            quality,
            quality_list_state: ListState::default(),
            video_error: false,
            loading_message: String::new(),
            loading_return: Screen::Home,
            status_message: None,
            error_message: None,
            show_help: false,
            keybindings,
        }
    }

    /// Set the app to loading state with a message.
    pub fn set_loading(&mut self, message: &str) {
        if self.screen != Screen::Loading {
            self.loading_return = self.screen;
        }
        self.screen = Screen::Loading;
        self.loading_message = message.to_string();
    }

    /// Leave the loading screen without new content.
    pub fn cancel_loading(&mut self) {
        if self.screen == Screen::Loading {
            self.screen = self.loading_return;
        }
    }

    /// Set the home feed and switch to the home screen.
    pub fn set_feed(&mut self, feed: HomeFeed) {
        self.feed = feed;
        let len = self.section_dramas().len();
        select_first(&mut self.feed_list_state, len);
        self.screen = Screen::Home;
    }

    /// Set the popular search terms shown on the search screen.
    pub fn set_popular_searches(&mut self, terms: Vec<String>) {
        select_first(&mut self.popular_list_state, terms.len());
        self.popular_searches = terms;
    }

    /// Set search results and switch to the results screen.
    pub fn set_search_results(&mut self, query: &str, results: Vec<Drama>) {
        self.search_query = query.to_string();
        // Searching again from the results keeps the first origin
        if self.search_origin != Screen::SearchResults {
            self.results_origin = self.search_origin;
        }
        select_first(&mut self.results_list_state, results.len());
        self.search_results = results;
        self.screen = Screen::SearchResults;
    }

    /// Open a drama's detail page with its episode list.
    pub fn set_drama(&mut self, drama: Drama, episodes: Vec<Episode>) {
        self.drama = Some(drama);
        self.episodes = episodes;
        self.current_episode = 1;
        self.cursor_episode = 1;
        self.pager = EpisodePager::new(self.total_episodes(), self.page_size);
        self.video_error = false;
        self.screen = Screen::Detail;
    }

    /// Section currently selected in the sidebar.
    pub fn selected_section(&self) -> Section {
        let i = self.section_list_state.selected().unwrap_or(0);
        Section::ALL[i.min(Section::ALL.len() - 1)]
    }

    /// Dramas of the selected home section.
    pub fn section_dramas(&self) -> &[Drama] {
        self.feed
            .get(self.selected_section())
            .map(|s| s.dramas.as_slice())
            .unwrap_or(&[])
    }

    /// Load error of the selected home section, if any.
    pub fn section_error(&self) -> Option<&str> {
        self.feed
            .get(self.selected_section())
            .and_then(|s| s.error.as_deref())
    }

    /// Drama highlighted in the list on the current screen.
    pub fn highlighted_drama(&self) -> Option<&Drama> {
        match self.screen {
            Screen::Home => self.section_dramas().get(self.feed_list_state.selected()?),
            Screen::SearchResults => self.search_results.get(self.results_list_state.selected()?),
            _ => None,
        }
    }

    /// Episode count: the catalog's count, else the number fetched.
    pub fn total_episodes(&self) -> usize {
        self.drama
            .as_ref()
            .map(|d| d.chapter_count)
            .filter(|count| *count > 0)
            .unwrap_or(self.episodes.len())
    }

    /// Episode record for the episode being watched.
    pub fn current_episode_data(&self) -> Option<&Episode> {
        self.current_episode
            .checked_sub(1)
            .and_then(|i| self.episodes.get(i))
    }

    /// URL to play for the current episode at the selected quality.
    pub fn video_url(&self) -> Option<&str> {
        media::resolve_video_url(self.current_episode_data(), self.quality)
    }

    /// Qualities offered for the current episode.
    pub fn available_qualities(&self) -> Vec<u32> {
        media::available_qualities(self.current_episode_data())
    }

    /// Page buttons of the episode grid.
    pub fn page_buttons(&self) -> Vec<usize> {
        self.pager.buttons(PAGE_BUTTON_WINDOW)
    }

    /// Switch to episode `episode` if it exists.
    ///
    /// Moves the grid to the episode's page and returns the play action.
    pub fn go_to_episode(&mut self, episode: usize) -> Action {
        if !self.pager.can_go_to(episode) {
            return Action::None;
        }
        self.current_episode = episode;
        self.cursor_episode = episode;
        self.pager.show_episode(episode);
        self.video_error = false;
        self.screen = Screen::Watch;
        Action::Play(episode)
    }

    /// Change the selected quality.
    pub fn set_quality(&mut self, quality: u32) {
        self.quality = quality;
        self.video_error = false;
    }

    /// Record that the player could not play the current URL.
    pub fn set_video_error(&mut self, message: &str) {
        self.video_error = true;
        self.status_message = Some(message.to_string());
    }

    /// Text for the player area of the watch screen.
    pub fn playback_message(&self) -> String {
        if self.video_error {
            "Video cannot be played\nTry another quality or another episode".to_string()
        } else if self.episodes.is_empty() {
            "No episodes loaded".to_string()
        } else {
            match self.video_url() {
                Some(url) => format!("Playing in external player\n{}", url),
                None => "Episode not available".to_string(),
            }
        }
    }

    /// Set an error message.
    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    /// Clear error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Set status message.
    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        if self.show_help {
            if key.code == KeyCode::Esc
                || self.keybindings.matches(&self.keybindings.help, &key)
                || self.keybindings.matches(&self.keybindings.quit, &key)
            {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.search_focused {
            return self.handle_search_bar_input(key);
        }

        if self.keybindings.matches(&self.keybindings.help, &key) {
            self.show_help = true;
            return Action::None;
        }

        if self.screen == Screen::Loading {
            if self.keybindings.matches(&self.keybindings.quit, &key) {
                self.should_quit = true;
                return Action::Quit;
            }
            return Action::None;
        }

        if self
            .keybindings
            .matches(&self.keybindings.toggle_focus, &key)
        {
            self.focus = match self.focus {
                Focus::Sidebar => Focus::Main,
                Focus::Main => Focus::Sidebar,
            };
            return Action::None;
        }

        // Open the search bar from anywhere
        if self.keybindings.matches(&self.keybindings.search, &key) {
            self.open_search();
            return Action::None;
        }

        if self.keybindings.matches(&self.keybindings.quit, &key) {
            self.should_quit = true;
            return Action::Quit;
        }

        if self.focus == Focus::Sidebar {
            return self.handle_sidebar_input(key);
        }

        match self.screen {
            Screen::Home => self.handle_home_input(key),
            Screen::Search => self.handle_search_input(key),
            Screen::SearchResults => self.handle_results_input(key),
            Screen::Detail => self.handle_detail_input(key),
            Screen::Watch => self.handle_watch_input(key),
            Screen::QualitySelect => self.handle_quality_input(key),
            Screen::Loading => Action::None,
        }
    }

    fn open_search(&mut self) {
        self.search_focused = true;
        self.focus = Focus::Main;
        if self.screen != Screen::Search {
            self.search_origin = self.screen;
            self.screen = Screen::Search;
        }
    }

    fn close_search(&mut self) {
        self.search_input.clear();
        self.search_focused = false;
        if self.screen == Screen::Search {
            self.screen = self.search_origin;
        }
    }

    fn selected_popular_search(&self) -> Option<String> {
        self.popular_list_state
            .selected()
            .and_then(|i| self.popular_searches.get(i))
            .cloned()
    }

    fn handle_search_bar_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                let query = self.search_input.trim().to_string();
                if !query.is_empty() {
                    self.search_input.clear();
                    self.search_focused = false;
                    Action::Search(query)
                } else if let Some(term) = self.selected_popular_search() {
                    self.search_focused = false;
                    Action::Search(term)
                } else {
                    self.search_focused = false;
                    Action::None
                }
            }
            KeyCode::Up => {
                select_prev(&mut self.popular_list_state);
                Action::None
            }
            KeyCode::Down => {
                select_next(&mut self.popular_list_state, self.popular_searches.len());
                Action::None
            }
            KeyCode::Tab => {
                self.search_focused = false;
                Action::None
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                Action::None
            }
            KeyCode::Esc => {
                self.close_search();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_sidebar_input(&mut self, key: KeyEvent) -> Action {
        if self.keybindings.matches(&self.keybindings.up, &key) {
            select_prev(&mut self.section_list_state);
            self.reset_feed_selection();
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            select_next(&mut self.section_list_state, Section::ALL.len());
            self.reset_feed_selection();
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            self.focus = Focus::Main;
            self.screen = Screen::Home;
        }
        Action::None
    }

    fn reset_feed_selection(&mut self) {
        let len = self.section_dramas().len();
        select_first(&mut self.feed_list_state, len);
    }

    fn handle_home_input(&mut self, key: KeyEvent) -> Action {
        let len = self.section_dramas().len();

        if self.keybindings.matches(&self.keybindings.up, &key) {
            select_prev(&mut self.feed_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            select_next(&mut self.feed_list_state, len);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            self.open_highlighted_drama()
        } else if self.keybindings.matches(&self.keybindings.refresh, &key) {
            Action::Refresh
        } else {
            Action::None
        }
    }

    fn open_highlighted_drama(&mut self) -> Action {
        match self.highlighted_drama().map(|d| d.book_id.clone()) {
            Some(book_id) if !book_id.is_empty() => {
                self.detail_origin = self.screen;
                Action::OpenDrama(book_id)
            }
            _ => Action::None,
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) -> Action {
        if self.keybindings.matches(&self.keybindings.up, &key) {
            select_prev(&mut self.popular_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            select_next(&mut self.popular_list_state, self.popular_searches.len());
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            match self.selected_popular_search() {
                Some(term) => Action::Search(term),
                None => Action::None,
            }
        } else if self.keybindings.matches(&self.keybindings.back, &key) {
            self.close_search();
            Action::None
        } else {
            Action::None
        }
    }

    fn handle_results_input(&mut self, key: KeyEvent) -> Action {
        if self.keybindings.matches(&self.keybindings.up, &key) {
            select_prev(&mut self.results_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            select_next(&mut self.results_list_state, self.search_results.len());
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            self.open_highlighted_drama()
        } else if self.keybindings.matches(&self.keybindings.back, &key) {
            self.screen = self.results_origin;
            Action::None
        } else {
            Action::None
        }
    }

    fn handle_detail_input(&mut self, key: KeyEvent) -> Action {
        if self.keybindings.matches(&self.keybindings.select, &key)
            || self.keybindings.matches(&self.keybindings.watch, &key)
        {
            let action = self.go_to_episode(1);
            if action == Action::None {
                self.set_error("No episodes available for this drama");
            }
            action
        } else if self.keybindings.matches(&self.keybindings.back, &key) {
            self.screen = self.detail_origin;
            Action::None
        } else {
            Action::None
        }
    }

    /// Move the grid cursor by `delta` episodes, following it across pages.
    fn move_cursor(&mut self, delta: isize) {
        let total = self.pager.total_episodes();
        if total == 0 {
            return;
        }
        let target = self.cursor_episode as isize + delta;
        self.cursor_episode = target.clamp(1, total as isize) as usize;
        self.pager.show_episode(self.cursor_episode);
    }

    fn cursor_to_page_start(&mut self) {
        if let Some((first, _)) = self.pager.range() {
            self.cursor_episode = first;
        }
    }

    fn handle_watch_input(&mut self, key: KeyEvent) -> Action {
        let kb = &self.keybindings;

        if kb.matches(&kb.left, &key) {
            self.move_cursor(-1);
            Action::None
        } else if kb.matches(&kb.right, &key) {
            self.move_cursor(1);
            Action::None
        } else if kb.matches(&kb.up, &key) {
            self.move_cursor(-(GRID_COLUMNS as isize));
            Action::None
        } else if kb.matches(&kb.down, &key) {
            self.move_cursor(GRID_COLUMNS as isize);
            Action::None
        } else if kb.matches(&kb.next_page, &key) {
            self.pager.next_page();
            self.cursor_to_page_start();
            Action::None
        } else if kb.matches(&kb.prev_page, &key) {
            self.pager.prev_page();
            self.cursor_to_page_start();
            Action::None
        } else if kb.matches(&kb.select, &key) {
            self.go_to_episode(self.cursor_episode)
        } else if kb.matches(&kb.next, &key) {
            self.go_to_episode(self.current_episode + 1)
        } else if kb.matches(&kb.previous, &key) {
            match self.current_episode.checked_sub(1) {
                Some(episode) => self.go_to_episode(episode),
                None => Action::None,
            }
        } else if kb.matches(&kb.quality, &key) {
            let qualities = self.available_qualities();
            let index = qualities.iter().position(|q| *q == self.quality).unwrap_or(0);
            self.quality_list_state.select(Some(index));
            self.screen = Screen::QualitySelect;
            Action::None
        } else if kb.matches(&kb.back, &key) {
            self.screen = Screen::Detail;
            Action::None
        } else {
            Action::None
        }
    }

    fn handle_quality_input(&mut self, key: KeyEvent) -> Action {
        let qualities = self.available_qualities();

        if self.keybindings.matches(&self.keybindings.up, &key) {
            select_prev(&mut self.quality_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            select_next(&mut self.quality_list_state, qualities.len());
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            let chosen = self
                .quality_list_state
                .selected()
                .and_then(|i| qualities.get(i).copied());
            self.screen = Screen::Watch;
            match chosen {
                Some(quality) => {
                    self.set_quality(quality);
                    Action::ChangeQuality(quality)
                }
                None => Action::None,
            }
        } else if self.keybindings.matches(&self.keybindings.back, &key) {
            self.screen = Screen::Watch;
            Action::None
        } else {
            Action::None
        }
    }
}
