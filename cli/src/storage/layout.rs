//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Name of the per-user configuration directory
pub const CONFIG_DIR_NAME: &str = ".backend-im";

/// Storage layout for the CLI
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The configuration directory itself
    pub fn config_dir(&self) -> Dir {
        Dir::new(&self.base_dir)
    }

    /// Get the token file path
    pub fn token_file(&self) -> File {
        File::new(self.base_dir.join("token.json"))
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> File {
        File::new(self.base_dir.join("settings.json"))
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);

        Self::new(base_dir)
    }
}
