//! Path management
//!
//! All filesystem locations the server touches hang off a single config
//! directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
}

impl Paths {
    /// Resolve the config directory and create the tree below it.
    ///
    /// Without an override the platform config dir is used
    /// (`~/.config/media-catalog` on Linux).
    pub fn new(config_override: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "media-catalog")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".media-catalog")),
        };

        let paths = Self { config_dir };
        paths.create_directories()?;

        Ok(paths)
    }

    fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("Failed to create config dir {}", self.config_dir.display())
        })?;
        std::fs::create_dir_all(self.images_dir())?;

        Ok(())
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the catalog database path
    pub fn db_path(&self) -> PathBuf {
        self.config_dir.join("catalog.db")
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Directory holding uploaded images
    pub fn images_dir(&self) -> PathBuf {
        self.config_dir.join("images")
    }

    /// Map a stored reference like `images/abc.png` back to its file.
    ///
    /// Returns `None` for anything that does not point inside the images dir.
    pub fn image_file(&self, reference: &str) -> Option<PathBuf> {
        let name = reference
            .trim_start_matches('/')
            .strip_prefix(super::IMAGES_URL_PREFIX)?
            .strip_prefix('/')?;

        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }

        Some(self.images_dir().join(name))
    }
}
