//! External video player discovery and launch.

use crate::error::{AppError, Result};
use log::{debug, info, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// Search for an executable in the system PATH.
///
/// Handles:
/// - Absolute paths (checked directly)
/// - Relative paths with separators (checked directly)
/// - Windows PATHEXT extensions (.exe, .cmd, .bat)
/// - Standard PATH search
pub fn find_in_path<P: AsRef<Path>>(exe_name: P) -> Option<PathBuf> {
    let exe_path = exe_name.as_ref();

    if exe_path.is_absolute()
        || exe_path
            .to_string_lossy()
            .contains(std::path::MAIN_SEPARATOR)
    {
        if exe_path.is_file() {
            return Some(exe_path.to_path_buf());
        }
        #[cfg(windows)]
        {
            for ext in &[".exe", ".cmd", ".bat", ".com"] {
                let with_ext = exe_path.with_extension(&ext[1..]);
                if with_ext.is_file() {
                    return Some(with_ext);
                }
            }
        }
        return None;
    }

    env::var_os("PATH").and_then(|paths| {
        #[cfg(windows)]
        let extensions: Vec<String> = env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_lowercase())
            .collect();

        env::split_paths(&paths).find_map(|dir| {
            let full_path = dir.join(exe_path);

            if full_path.is_file() {
                return Some(full_path);
            }

            #[cfg(windows)]
            {
                for ext in &extensions {
                    let ext_trimmed = ext.trim_start_matches('.');
                    let with_ext = full_path.with_extension(ext_trimmed);
                    if with_ext.is_file() {
                        return Some(with_ext);
                    }
                }
            }

            None
        })
    })
}

/// Get the appropriate video player for the current operating system.
pub fn default_player() -> Result<&'static str> {
    match env::consts::OS {
        "linux" => Ok("mpv"),
        "windows" => Ok("mpv.exe"),
        "macos" => Ok("iina"),
        other => Err(AppError::Player(format!("OS '{}' is not supported", other))),
    }
}

/// A video player command plus the arguments placed before the URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub command: String,
    pub args: Vec<String>,
}

impl Player {
    /// Pick the player from the CLI flag, then the config, then the
    /// platform default.
    pub fn resolve(
        cli_player: Option<&str>,
        config_player: Option<&str>,
        args: Vec<String>,
    ) -> Result<Self> {
        let command = match cli_player.or(config_player) {
            Some(p) => p.to_string(),
            None => default_player()?.to_string(),
        };
        Ok(Self { command, args })
    }

    /// Fail unless the player executable can be found.
    pub fn ensure_installed(&self) -> Result<()> {
        match find_in_path(&self.command) {
            Some(path) => {
                info!("Using video player: {}", path.display());
                Ok(())
            }
            None => Err(AppError::Player(format!("{} not found in PATH", self.command))),
        }
    }

    /// The command that would play `url`.
    pub fn command_for(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args).arg(url);
        cmd
    }

    /// Start playing `url` in the background.
    pub fn play(&self, url: &str) -> Result<()> {
        debug!("Playing: {}", url);

        let mut child = self
            .command_for(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Player(format!("Failed to start {}: {}", self.command, e)))?;

        // Reap the player once it exits
        let command = self.command.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) => debug!("{} exited with {}", command, status),
            Err(e) => warn!("Failed to wait for {}: {}", command, e),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_cli_over_config() {
        let player = Player::resolve(Some("vlc"), Some("mpv"), vec![]).unwrap();
        assert_eq!(player.command, "vlc");

        let player = Player::resolve(None, Some("mpv"), vec!["--fs".to_string()]).unwrap();
        assert_eq!(player.command, "mpv");
        assert_eq!(player.args, vec!["--fs"]);
    }

    #[test]
    fn test_command_for_appends_url_last() {
        let player = Player {
            command: "mpv".to_string(),
            args: vec!["--fs".to_string()],
        };
        let cmd = player.command_for("https://cdn/ep1.mp4");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "mpv");
        assert_eq!(args, vec!["--fs", "https://cdn/ep1.mp4"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_play_starts_and_reaps_player() {
        let player = Player {
            command: "true".to_string(),
            args: vec![],
        };
        assert!(player.play("https://cdn/ep1.mp4").is_ok());
    }

    #[test]
    fn test_find_in_path_missing() {
        assert!(find_in_path("definitely-not-a-real-player-binary").is_none());
    }

    #[test]
    fn test_missing_player_reports_error() {
        let player = Player {
            command: "definitely-not-a-real-player-binary".to_string(),
            args: vec![],
        };
        assert!(matches!(player.ensure_installed(), Err(AppError::Player(_))));
        assert!(matches!(player.play("https://x"), Err(AppError::Player(_))));
    }
}
