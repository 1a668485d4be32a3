//! TUI type definitions for screens, focus, and actions.

/// The current screen/view of the application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    /// Home feed sections
    Home,
    /// Search bar open, popular searches listed
    Search,
    /// Browsing search results
    SearchResults,
    /// Drama detail page
    Detail,
    /// Watching an episode, with the episode grid
    Watch,
    /// Selecting video quality
    QualitySelect,
    /// Loading/waiting for API response
    Loading,
}

/// Focus state for split-panel views.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Sidebar,
    Main,
}

/// Actions that the event loop has to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Perform a search with the given query
    Search(String),
    /// Load detail and episodes of a drama by book id
    OpenDrama(String),
    /// Play the given episode number
    Play(usize),
    /// Switch to a new video quality and replay
    ChangeQuality(u32),
    /// Reload the home feed
    Refresh,
}
