//! One-shot seeding scan of pre-existing files.

use std::path::Path;
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::types::Task;

use super::queue::TaskQueue;

/// Enumerates files already present under the watch root.
///
/// Runs exactly once before live watching begins, so files that predate the
/// watcher still get processed even though no creation event will ever fire
/// for them.
pub struct Scanner {
    config: ProcessingConfig,
}

impl Scanner {
    /// Create a scanner with the given input selection settings.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Walk `root` recursively and queue every recognized image file.
    ///
    /// Returns the number of tasks queued.
    pub fn scan(&self, root: &Path, queue: &TaskQueue) -> usize {
        let mut entries: Vec<_> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && self.config.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        // Sort for deterministic seeding order
        entries.sort();

        let count = entries.len();
        for path in entries {
            tracing::debug!("Found existing image: {}", path.display());
            queue.push(Task::new(path));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::queue::task_queue;

    #[tokio::test]
    async fn test_scan_queues_nested_images_only() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("trip");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(sub.join("b.HEIC"), b"x").unwrap();
        std::fs::write(sub.join("c.png"), b"x").unwrap();

        let (queue, mut rx) = task_queue();
        let scanner = Scanner::new(ProcessingConfig::default());
        let count = scanner.scan(dir.path(), &queue);
        drop(queue);

        assert_eq!(count, 3);
        let mut paths = Vec::new();
        while let Some(task) = rx.pop().await {
            assert_eq!(task.attempt, 1);
            paths.push(task.path);
        }
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.extension().is_some()));
    }

    #[tokio::test]
    async fn test_scan_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let (queue, _rx) = task_queue();
        let scanner = Scanner::new(ProcessingConfig::default());
        assert_eq!(scanner.scan(dir.path(), &queue), 0);
    }
}
