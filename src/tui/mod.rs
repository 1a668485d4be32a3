//! Terminal User Interface for drama-watcher using ratatui.
//!
//! This module provides a full-screen TUI with a section sidebar, drama
//! lists, a detail page and a watch page with a paged episode grid.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::{App, GRID_COLUMNS};
pub use types::{Action, Focus, Screen};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
