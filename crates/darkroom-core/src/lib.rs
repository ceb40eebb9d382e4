//! Darkroom Core - folder-watching image normalization library.
//!
//! Darkroom watches a directory tree for image files, waits until each file
//! is fully written, and normalizes it in place: resizing to a maximum
//! bounding box, converting HEIC/HEIF to JPEG, and carrying EXIF/ICC
//! metadata through unchanged.
//!
//! # Architecture
//!
//! ```text
//! Scanner ─────────┐
//!                  ├──> TaskQueue ──> Worker ──> StabilityChecker ──> ImageCodec
//! Watcher ─ bridge ┘        ^                        │
//!                           └── requeue on failure ──┘
//! ```
//!
//! The scanner and the event bridge only ever push; a single worker pops,
//! and a failed task goes back to the queue with a bumped attempt counter
//! until the retry budget runs out.
//!
//! # Usage
//!
//! ```rust,ignore
//! use darkroom_core::{Config, Darkroom};
//!
//! #[tokio::main]
//! async fn main() -> darkroom_core::Result<()> {
//!     let config = Config::load()?;
//!     Darkroom::new(config).run().await
//! }
//! ```

// Module declarations
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod watch;

// Re-exports for convenient access
pub use codec::{ImageCodec, ImageKind, ImageMetadata, ImageRsCodec};
pub use config::Config;
pub use error::{ConfigError, DarkroomError, PipelineError, PipelineResult, Result};
pub use pipeline::{Scanner, StabilityChecker, Worker};
pub use types::{Normalization, Task, TaskOutcome};

use std::sync::Arc;

use pipeline::task_queue;
use watch::{spawn_bridge, NotifyWatcher};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The orchestrator: wires scanner, watcher, queue and worker together and
/// manages process lifetime.
pub struct Darkroom {
    config: Config,
}

impl Darkroom {
    /// Create a new instance with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing Darkroom v{}", VERSION);
        Self { config }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until interrupted.
    ///
    /// Seeds the queue with pre-existing files, spawns the single worker,
    /// starts the live watcher, then blocks until Ctrl-C. Shutdown is not
    /// graceful by design: queued and in-flight tasks are abandoned.
    pub async fn run(&self) -> Result<()> {
        let root = self.config.watch_root();
        if !root.is_dir() {
            return Err(DarkroomError::RootNotFound(root));
        }

        let (queue, rx) = task_queue();
        let codec = Arc::new(ImageRsCodec::new(&self.config.normalize));
        let worker = Worker::new(codec, &self.config, queue.clone(), rx);
        let worker_handle = tokio::spawn(worker.run());

        // One-shot seeding before live events start flowing
        let scanner = Scanner::new(self.config.processing.clone());
        let queued = scanner.scan(&root, &queue);
        tracing::info!(
            "Initial scan queued {} images under {}",
            queued,
            root.display()
        );

        let (watcher, events) = NotifyWatcher::watch(&root)?;
        let bridge = spawn_bridge(events, queue.clone(), self.config.processing.clone());

        tokio::signal::ctrl_c().await?;
        tracing::info!("Interrupt received, stopping");

        drop(watcher);
        bridge.abort();
        worker_handle.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_darkroom_new() {
        let darkroom = Darkroom::new(Config::default());
        assert_eq!(darkroom.config().queue.max_retries, 5);
    }

    #[tokio::test]
    async fn test_run_rejects_missing_root() {
        let mut config = Config::default();
        config.watch.root = "/nonexistent/darkroom/test/root".to_string();
        let darkroom = Darkroom::new(config);

        let result = darkroom.run().await;
        assert!(matches!(result, Err(DarkroomError::RootNotFound(_))));
    }
}
