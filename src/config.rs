//! Configuration file support for drama-watcher.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::error::Result;
use crate::media::DEFAULT_QUALITY;
use crate::paging::EPISODES_PER_PAGE;
use crossterm::event::{KeyCode, KeyEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Base URL of the DramaBox listing API.
pub const DEFAULT_API_BASE_URL: &str = "https://dramabox.sansekai.my.id/api/dramabox";

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the upstream API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Video quality used when there is no stored preference
    #[serde(default = "default_quality")]
    pub quality: u32,

    /// Episodes per page in the episode grid
    #[serde(default = "default_episodes_per_page")]
    pub episodes_per_page: usize,

    /// Seconds before an API request is abandoned
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Video player command (overrides platform default)
    #[serde(default)]
    pub player: Option<String>,

    /// Additional arguments to pass to the video player
    #[serde(default)]
    pub player_args: Vec<String>,

    /// Key bindings for the TUI
    #[serde(default)]
    pub keybindings: Keybindings,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_quality() -> u32 {
    DEFAULT_QUALITY
}

fn default_episodes_per_page() -> usize {
    EPISODES_PER_PAGE
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            quality: default_quality(),
            episodes_per_page: default_episodes_per_page(),
            request_timeout_secs: default_request_timeout_secs(),
            player: None,
            player_args: Vec::new(),
            keybindings: Keybindings::default(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/drama-watcher/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("drama-watcher");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`, or defaults when it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save config to `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        Self::create_default_at(&path)?;
        Ok(path)
    }

    /// Write the default config to `path` unless a file is already there.
    ///
    /// Returns whether a file was written.
    pub fn create_default_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::new().save_to(path)?;
        Ok(true)
    }
}

/// Keys bound to each TUI command.
///
/// Each entry lists key names: a single character (`"j"`, `"?"`) or one of
/// `Up`, `Down`, `Left`, `Right`, `Enter`, `Esc`, `Backspace`, `Tab`,
/// `PageUp`, `PageDown`, `Home`, `End`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub quit: Vec<String>,
    pub help: Vec<String>,
    pub search: Vec<String>,
    pub toggle_focus: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub select: Vec<String>,
    pub back: Vec<String>,
    pub next: Vec<String>,
    pub previous: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub quality: Vec<String>,
    pub watch: Vec<String>,
    pub refresh: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            quit: keys(&["q"]),
            help: keys(&["?"]),
            search: keys(&["/"]),
            toggle_focus: keys(&["Tab"]),
            up: keys(&["k", "Up"]),
            down: keys(&["j", "Down"]),
            left: keys(&["h", "Left"]),
            right: keys(&["l", "Right"]),
            select: keys(&["Enter"]),
            back: keys(&["Backspace", "Esc"]),
            next: keys(&["n"]),
            previous: keys(&["p"]),
            next_page: keys(&["]", "PageDown"]),
            prev_page: keys(&["[", "PageUp"]),
            quality: keys(&["c"]),
            watch: keys(&["w"]),
            refresh: keys(&["r"]),
        }
    }
}

impl Keybindings {
    /// Whether `key` is one of the keys in `binding`.
    pub fn matches(&self, binding: &[String], key: &KeyEvent) -> bool {
        binding
            .iter()
            .filter_map(|name| parse_key(name))
            .any(|code| code == key.code)
    }
}

fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    match name.to_lowercase().as_str() {
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "enter" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "backspace" => Some(KeyCode::Backspace),
        "tab" => Some(KeyCode::Tab),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.quality, 720);
        assert_eq!(config.episodes_per_page, 30);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.player.is_none());
        assert!(config.player_args.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            quality: 1080,
            player: Some("vlc".to_string()),
            player_args: vec!["--fullscreen".to_string()],
            ..Config::new()
        };

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("quality = 1080"));
        assert!(toml_str.contains("player = \"vlc\""));
        assert!(toml_str.contains("player_args"));
        assert!(toml_str.contains("[keybindings]"));
    }

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("drama-watcher-config-{}-{}", name, std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_config_path("round-trip");
        let config = Config {
            quality: 540,
            player: Some("vlc".to_string()),
            player_args: vec!["--fullscreen".to_string()],
            ..Config::new()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.quality, 540);
        assert_eq!(loaded.player.as_deref(), Some("vlc"));
        assert_eq!(loaded.player_args, vec!["--fullscreen"]);
        assert_eq!(loaded.keybindings.quit, vec!["q"]);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_create_default_keeps_existing_file() {
        let path = temp_config_path("create-default");
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert!(Config::create_default_at(&path).unwrap());
        assert_eq!(Config::load_from(&path).unwrap().quality, 720);

        fs::write(&path, "quality = 1080\n").unwrap();
        assert!(!Config::create_default_at(&path).unwrap());
        assert_eq!(Config::load_from(&path).unwrap().quality, 1080);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = temp_config_path("missing");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.quality, 720);
    }

    #[test]
    fn test_config_partial_deserialization() {
        let toml_str = r#"
            quality = 540
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quality, 540);
        assert_eq!(config.episodes_per_page, 30); // default
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL); // default
        assert_eq!(config.keybindings.quit, vec!["q"]);
    }

    #[test]
    fn test_keybindings_partial_override() {
        let toml_str = r#"
            [keybindings]
            quit = ["x"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        let kb = &config.keybindings;
        assert!(kb.matches(&kb.quit, &key(KeyCode::Char('x'))));
        assert!(!kb.matches(&kb.quit, &key(KeyCode::Char('q'))));
        assert!(kb.matches(&kb.up, &key(KeyCode::Up)));
    }

    #[test]
    fn test_keybindings_named_keys() {
        let kb = Keybindings::default();
        assert!(kb.matches(&kb.back, &key(KeyCode::Esc)));
        assert!(kb.matches(&kb.back, &key(KeyCode::Backspace)));
        assert!(kb.matches(&kb.next_page, &key(KeyCode::PageDown)));
        assert!(kb.matches(&kb.down, &key(KeyCode::Char('j'))));
        assert!(!kb.matches(&kb.down, &key(KeyCode::Char('k'))));
    }

    #[test]
    fn test_parse_key_unknown_name() {
        assert_eq!(parse_key("NotAKey"), None);
        assert_eq!(parse_key("space"), Some(KeyCode::Char(' ')));
    }
}
