//! Persistence of the last-chosen video quality.
//!
//! The watch screen reads the stored quality once at startup and writes it
//! back whenever the user picks another one. Storage sits behind the
//! [`QualityStore`] trait so the rest of the app never touches the
//! filesystem directly.

use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Read/write access to the stored quality preference.
pub trait QualityStore {
    /// The stored quality, if one was saved.
    fn load(&self) -> Option<u32>;

    /// Persist `quality` as the new preference.
    fn save(&mut self, quality: u32) -> Result<()>;
}

/// On-disk layout of the preferences file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default)]
    video_quality: Option<u32>,
}

/// Quality preference kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileQualityStore {
    path: PathBuf,
}

impl FileQualityStore {
    /// Store backed by an explicit file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location.
    ///
    /// Returns ~/.local/share/drama-watcher/preferences.json on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not find data directory"))?
            .join("drama-watcher");

        Ok(Self::new(data_dir.join("preferences.json")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl QualityStore for FileQualityStore {
    fn load(&self) -> Option<u32> {
        match self.read() {
            Ok(prefs) => prefs.video_quality,
            Err(e) => {
                warn!("Ignoring unreadable preferences at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&mut self, quality: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut prefs = self.read().unwrap_or_default();
        prefs.video_quality = Some(quality);
        fs::write(&self.path, serde_json::to_string_pretty(&prefs)?)?;
        debug!("Saved video quality {} to {}", quality, self.path.display());
        Ok(())
    }
}

/// In-memory store, useful when nothing should be persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryQualityStore {
    quality: Option<u32>,
}

impl MemoryQualityStore {
    pub fn new(quality: Option<u32>) -> Self {
        Self { quality }
    }
}

impl QualityStore for MemoryQualityStore {
    fn load(&self) -> Option<u32> {
        self.quality
    }

    fn save(&mut self, quality: u32) -> Result<()> {
        self.quality = Some(quality);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("drama-watcher-test-{}-{}", name, nanos))
            .join("preferences.json")
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryQualityStore::default();
        assert_eq!(store.load(), None);
        store.save(1080).unwrap();
        assert_eq!(store.load(), Some(1080));
    }

    #[test]
    fn test_file_store_missing_file() {
        let store = FileQualityStore::new(temp_path("missing"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_file_store_save_creates_dirs() {
        let path = temp_path("save");
        let mut store = FileQualityStore::new(path.clone());
        store.save(540).unwrap();
        assert!(path.exists());

        let reopened = FileQualityStore::new(path.clone());
        assert_eq!(reopened.load(), Some(540));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_corrupt_file_reads_none() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let mut store = FileQualityStore::new(path.clone());
        assert_eq!(store.load(), None);

        store.save(720).unwrap();
        assert_eq!(store.load(), Some(720));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
