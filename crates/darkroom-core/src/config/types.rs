//! Sub-configuration structs with defaults matching the stock deployment.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Watched folder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Root folder to scan and watch (recursive). Supports `~` expansion.
    pub root: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: "~/Pictures".to_string(),
        }
    }
}

/// Resize and output policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Maximum output width in pixels
    pub max_width: u32,

    /// Maximum output height in pixels
    pub max_height: u32,

    /// JPEG quality for rewritten and converted files (1-100)
    pub jpeg_quality: u8,

    /// Decoded-size threshold above which a cheap half-size pre-shrink runs
    /// before the high-quality resample. Estimated as width*height*3 bytes.
    pub large_image_threshold_mb: u64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1080,
            max_height: 768,
            jpeg_quality: 100,
            large_image_threshold_mb: 500,
        }
    }
}

impl NormalizeConfig {
    /// Pre-shrink threshold in bytes.
    pub fn large_image_threshold_bytes(&self) -> u64 {
        self.large_image_threshold_mb * 1024 * 1024
    }
}

/// File stability polling settings.
///
/// Writers (cameras, sync clients) often create the directory entry before
/// content is flushed, so the pipeline polls the size instead of relying on
/// OS-specific write-lock signaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Maximum number of size samples before giving up
    pub retries: u32,

    /// Sleep between samples in milliseconds
    pub interval_ms: u64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            retries: 10,
            interval_ms: 100,
        }
    }
}

impl StabilityConfig {
    /// Sample interval as a `Duration`.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }
}

/// Work queue retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum attempts per task before it is permanently dropped
    pub max_retries: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

/// Input selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions treated as candidate images (case-insensitive)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "tiff".to_string(),
                "bmp".to_string(),
                "gif".to_string(),
                "heic".to_string(),
                "heif".to_string(),
            ],
        }
    }
}

impl ProcessingConfig {
    /// Check if a path has a supported image extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
