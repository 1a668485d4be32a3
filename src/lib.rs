//! A terminal client for browsing and watching short dramas.
//!
//! drama-watcher lists the DramaBox home sections, searches the catalog,
//! shows drama details and plays episodes through mpv (or a
//! platform-specific player), with a paged episode grid and a remembered
//! video quality.
//!
//! # Features
//!
//! - Browse For You, Trending, Dub Indo and Latest sections
//! - Search by title or pick a popular search term
//! - Jump between episodes on a paged grid
//! - Switch video quality per episode, remembered across sessions
//!
//! # Usage
//!
//! ```bash
//! # Run with default settings
//! cargo run
//!
//! # Prefer 1080p and play with vlc
//! cargo run -- -q 1080 -p vlc
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod paging;
pub mod player;
pub mod preference;
pub mod tui;
pub mod types;
