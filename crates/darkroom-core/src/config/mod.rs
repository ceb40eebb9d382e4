//! Configuration management for Darkroom.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults; a missing file is not an error. All config structs implement
//! `Default` with the stock deployment values.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Darkroom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watched folder settings
    pub watch: WatchConfig,

    /// Resize and output policy settings
    pub normalize: NormalizeConfig,

    /// File stability polling settings
    pub stability: StabilityConfig,

    /// Work queue retry settings
    pub queue: QueueConfig,

    /// Input selection settings
    pub processing: ProcessingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.darkroom.darkroom/config.toml
    /// - Linux: ~/.config/darkroom/config.toml
    ///
    /// Falls back to ~/.darkroom/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "darkroom", "darkroom")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".darkroom").join("config.toml")
            })
    }

    /// Get the resolved watch root path (with ~ expansion).
    pub fn watch_root(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.watch.root);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.normalize.max_width, 1080);
        assert_eq!(config.normalize.max_height, 768);
        assert_eq!(config.stability.retries, 10);
        assert_eq!(config.stability.interval_ms, 100);
        assert_eq!(config.queue.max_retries, 5);
        assert_eq!(config.processing.supported_formats.len(), 8);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[watch]"));
        assert!(toml.contains("[normalize]"));
        assert!(toml.contains("[stability]"));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[normalize]\nmax_width = 1920\nmax_height = 1080\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.normalize.max_width, 1920);
        assert_eq!(config.normalize.max_height, 1080);
        // Untouched sections keep their defaults
        assert_eq!(config.queue.max_retries, 5);
    }

    #[test]
    fn test_load_from_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stability]\nretries = 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_watch_root_expansion() {
        let config = Config::default();
        let root = config.watch_root();
        // "~" must be gone after expansion
        assert!(!root.to_string_lossy().starts_with('~'));
    }
}
