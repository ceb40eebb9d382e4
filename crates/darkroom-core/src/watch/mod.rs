//! Filesystem event source and the event-to-task bridge.
//!
//! `NotifyWatcher` turns OS-level change notifications into plain
//! [`CreatedEvent`]s; the bridge filters them and feeds the task queue.
//! No de-duplication is done against the initial scan: a file racing the
//! startup scan may be queued twice, which the transform policy makes a
//! harmless no-op.

use notify::event::CreateKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::pipeline::TaskQueue;
use crate::types::Task;

/// A "file created" notification under the watch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    /// Path of the new entry
    pub path: PathBuf,

    /// Whether the entry is a directory
    pub is_directory: bool,
}

/// Recursive directory watcher emitting creation events.
///
/// Wraps `notify`'s recommended backend; the callback runs on notify's own
/// thread and forwards over an unbounded channel, so it never blocks the
/// notification subsystem.
pub struct NotifyWatcher {
    // Dropping the watcher stops the notification stream
    _watcher: RecommendedWatcher,
}

impl NotifyWatcher {
    /// Start watching `root` recursively.
    pub fn watch(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<CreatedEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let EventKind::Create(kind) = event.kind else {
                        return;
                    };
                    for path in event.paths {
                        let is_directory =
                            matches!(kind, CreateKind::Folder) || path.is_dir();
                        // Receiver gone means shutdown; nothing to do
                        let _ = tx.send(CreatedEvent { path, is_directory });
                    }
                }
                Err(e) => tracing::error!("Watch error: {e}"),
            },
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::info!("Watching for new images in {}", root.display());

        Ok((Self { _watcher: watcher }, rx))
    }
}

/// Forward creation events for image files into the task queue.
pub fn spawn_bridge(
    mut events: mpsc::UnboundedReceiver<CreatedEvent>,
    queue: TaskQueue,
    config: ProcessingConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if accepts(&config, &event) {
                tracing::info!("New image detected: {}", event.path.display());
                queue.push(Task::new(event.path));
            }
        }
    })
}

/// Bridge filter: non-directory entries with a recognized image extension.
fn accepts(config: &ProcessingConfig, event: &CreatedEvent) -> bool {
    !event.is_directory && config.is_supported(&event.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::task_queue;
    use std::time::Duration;

    fn event(path: &str, is_directory: bool) -> CreatedEvent {
        CreatedEvent {
            path: PathBuf::from(path),
            is_directory,
        }
    }

    #[test]
    fn test_accepts_filters_directories_and_non_images() {
        let config = ProcessingConfig::default();

        assert!(accepts(&config, &event("/p/new.jpg", false)));
        assert!(accepts(&config, &event("/p/new.HEIC", false)));
        assert!(!accepts(&config, &event("/p/album", true)));
        assert!(!accepts(&config, &event("/p/album.jpg", true)));
        assert!(!accepts(&config, &event("/p/notes.txt", false)));
    }

    #[tokio::test]
    async fn test_bridge_queues_image_events_at_attempt_one() {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (queue, mut task_rx) = task_queue();
        let bridge = spawn_bridge(event_rx, queue, ProcessingConfig::default());

        event_tx.send(event("/p/a.jpg", false)).unwrap();
        event_tx.send(event("/p/ignored.txt", false)).unwrap();
        event_tx.send(event("/p/subdir", true)).unwrap();
        event_tx.send(event("/p/b.png", false)).unwrap();
        drop(event_tx);
        bridge.await.unwrap();

        let first = task_rx.pop().await.unwrap();
        assert_eq!(first.path, PathBuf::from("/p/a.jpg"));
        assert_eq!(first.attempt, 1);
        let second = task_rx.pop().await.unwrap();
        assert_eq!(second.path, PathBuf::from("/p/b.png"));
    }

    #[tokio::test]
    async fn test_watcher_reports_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let (_watcher, mut events) = NotifyWatcher::watch(dir.path()).unwrap();

        let file = dir.path().join("fresh.jpg");
        std::fs::write(&file, b"data").unwrap();

        let received = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no event within timeout")
            .expect("event channel closed");
        // Compare file names; some platforms report canonicalized parents
        assert_eq!(received.path.file_name(), file.file_name());
        assert!(!received.is_directory);
    }
}
