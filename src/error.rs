//! Custom error types for drama-watcher.
//!
//! The media and paging helpers never fail; everything that talks to the
//! network, the filesystem or the player reports through [`AppError`].

use std::error::Error;
use std::fmt;
use std::io;

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// Network/HTTP errors
    Network(String),
    /// API response parsing errors
    Parse(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(io::Error),
    /// No results found
    NotFound(String),
    /// Invalid input from user
    InvalidInput(String),
    /// Player not found or failed to start
    Player(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Player(msg) => write!(f, "Player error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Parse(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.source().is_some());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Parse(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("quality = ").unwrap_err();
        let app_err: AppError = toml_err.into();
        assert!(app_err.to_string().starts_with("Config error:"));
    }

    #[test]
    fn test_error_player() {
        let err = AppError::Player("mpv not found in PATH".to_string());
        assert!(err.to_string().contains("mpv not found"));
    }
}
