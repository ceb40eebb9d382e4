//! Error types for the Darkroom normalization pipeline.
//!
//! Errors are organized by layer: configuration, per-task pipeline failures,
//! and everything that can go wrong wiring up the watcher. Per-task errors
//! never escape the worker loop; they feed the requeue-or-drop decision.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Darkroom operations.
#[derive(Error, Debug)]
pub enum DarkroomError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-task pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Filesystem notification errors
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// The configured watch root does not exist or is not a directory
    #[error("Watch root is not a directory: {0}")]
    RootNotFound(PathBuf),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-task pipeline errors.
///
/// `Unstable`, `Decode` and `Encode` are retryable: the worker requeues the
/// task with a bumped attempt counter until the retry budget runs out.
/// `UnsupportedFormat` is fatal and drops the task immediately. `Delete` is
/// best-effort only; it is logged and never fails the task that produced it.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File size never stabilized within the poll budget
    #[error("File still being written: {path}")]
    Unstable { path: PathBuf },

    /// Image decoding failed (corrupt, truncated or unreadable file)
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Re-encoding or writing the output failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Removing a converted original failed (non-fatal)
    #[error("Delete error for {path}: {message}")]
    Delete { path: PathBuf, message: String },

    /// File extension is not one the output policy can write
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },
}

impl PipelineError {
    /// Whether the worker should requeue a task that failed with this error.
    ///
    /// `Delete` never reaches the requeue decision (the conversion already
    /// succeeded when it fires) but is classified as non-retryable anyway.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Unstable { .. }
                | PipelineError::Decode { .. }
                | PipelineError::Encode { .. }
        )
    }
}

/// Convenience type alias for Darkroom results.
pub type Result<T> = std::result::Result<T, DarkroomError>;

/// Convenience type alias for per-task pipeline results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
