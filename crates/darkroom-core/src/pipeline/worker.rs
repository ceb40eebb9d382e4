//! The single consumer: pops tasks, processes them, applies the retry policy.

use std::sync::Arc;

use crate::codec::ImageCodec;
use crate::config::Config;
use crate::error::PipelineError;
use crate::types::{Normalization, Task, TaskOutcome};

use super::normalize::Normalizer;
use super::queue::{TaskQueue, TaskReceiver};
use super::stability::StabilityChecker;

/// The processing worker.
///
/// Exactly one worker consumes the queue, so a file is never processed by
/// two transforms at once. Every failure is contained to its task: the loop
/// applies the requeue-or-drop decision per [`TaskOutcome`] and moves on.
pub struct Worker<C: ImageCodec> {
    stability: StabilityChecker,
    normalizer: Normalizer<C>,
    queue: TaskQueue,
    rx: TaskReceiver,
    max_retries: u32,
}

impl<C: ImageCodec> Worker<C> {
    /// Create a worker consuming `rx`, requeueing onto `queue`.
    pub fn new(codec: Arc<C>, config: &Config, queue: TaskQueue, rx: TaskReceiver) -> Self {
        Self {
            stability: StabilityChecker::new(&config.stability),
            normalizer: Normalizer::new(codec, config.normalize.clone()),
            queue,
            rx,
            max_retries: config.queue.max_retries,
        }
    }

    /// Consume tasks until every push handle is gone.
    pub async fn run(mut self) {
        while self.run_once().await {}
        tracing::debug!("Task queue closed, worker exiting");
    }

    /// Pop and handle a single task. Returns `false` when the queue closed.
    pub async fn run_once(&mut self) -> bool {
        let Some(task) = self.rx.pop().await else {
            return false;
        };
        let outcome = self.process(&task).await;
        self.settle(task, outcome);
        true
    }

    /// Stability gate, then the transform; one increment-worthy failure per
    /// round at most.
    async fn process(&self, task: &Task) -> TaskOutcome {
        tracing::debug!(
            "Checking if file is ready: {} (attempt {})",
            task.path.display(),
            task.attempt
        );
        if !self.stability.wait_for_stability(&task.path).await {
            return TaskOutcome::Retry(PipelineError::Unstable {
                path: task.path.clone(),
            });
        }

        match self.normalizer.normalize(&task.path).await {
            Ok(result) => TaskOutcome::Completed(result),
            Err(e) if e.is_retryable() => TaskOutcome::Retry(e),
            Err(e) => TaskOutcome::Fatal(e),
        }
    }

    /// Apply the requeue-or-drop decision.
    fn settle(&self, task: Task, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Completed(Normalization::Skipped { width, height }) => {
                tracing::info!(
                    "No resize needed for {} ({}x{})",
                    task.path.display(),
                    width,
                    height
                );
            }
            TaskOutcome::Completed(Normalization::Resized { from, to }) => {
                tracing::info!(
                    "Resized {} from {}x{} to {}x{}",
                    task.path.display(),
                    from.0,
                    from.1,
                    to.0,
                    to.1
                );
            }
            TaskOutcome::Completed(Normalization::Converted { output, resized }) => {
                if resized {
                    tracing::info!(
                        "Converted and resized {} to {}",
                        task.path.display(),
                        output.display()
                    );
                } else {
                    tracing::info!("Converted {} to {}", task.path.display(), output.display());
                }
            }
            TaskOutcome::Retry(e) => {
                if task.attempt < self.max_retries {
                    tracing::warn!(
                        "Requeueing {} (attempt {}/{}): {}",
                        task.path.display(),
                        task.attempt,
                        self.max_retries,
                        e
                    );
                    self.queue.push(task.next_attempt());
                } else {
                    tracing::warn!(
                        "Max retries reached, dropping {}: {}",
                        task.path.display(),
                        e
                    );
                }
            }
            TaskOutcome::Fatal(e) => {
                tracing::error!("Dropping {}: {}", task.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::MockCodec;
    use crate::pipeline::queue::task_queue;
    use std::time::Duration;

    fn test_config() -> Config {
        let mut config = Config::default();
        // Tight timings so tests run in milliseconds
        config.stability.retries = 3;
        config.stability.interval_ms = 1;
        config
    }

    fn worker_with(codec: Arc<MockCodec>) -> (Worker<MockCodec>, TaskQueue) {
        let (queue, rx) = task_queue();
        let worker = Worker::new(codec, &test_config(), queue.clone(), rx);
        (worker, queue)
    }

    async fn assert_queue_empty(worker: &mut Worker<MockCodec>) {
        let blocked = tokio::time::timeout(Duration::from_millis(50), worker.run_once()).await;
        assert!(blocked.is_err(), "expected the queue to be empty");
    }

    #[tokio::test]
    async fn test_within_bounds_file_completes_without_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.jpg");
        std::fs::write(&path, b"stable file contents").unwrap();

        let codec = Arc::new(MockCodec::with_size(500, 400));
        let (mut worker, queue) = worker_with(Arc::clone(&codec));
        queue.push(Task::new(&path));

        assert!(worker.run_once().await);
        assert_eq!(codec.decode_calls(), 1);
        assert_eq!(codec.encode_calls(), 0);
        assert_queue_empty(&mut worker).await;
    }

    #[tokio::test]
    async fn test_corrupt_file_retried_then_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let codec = Arc::new(MockCodec::failing());
        let (mut worker, queue) = worker_with(Arc::clone(&codec));
        queue.push(Task::new(&path));

        // Attempts 1 through max_retries each decode once and fail
        for _ in 0..5 {
            assert!(worker.run_once().await);
        }
        assert_eq!(codec.decode_calls(), 5);

        // The fifth failure dropped the task instead of requeueing
        assert_queue_empty(&mut worker).await;
        assert_eq!(codec.decode_calls(), 5);
    }

    #[tokio::test]
    async fn test_unstable_file_requeued_without_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_yet.jpg");

        let codec = Arc::new(MockCodec::with_size(500, 400));
        let (mut worker, queue) = worker_with(Arc::clone(&codec));
        queue.push(Task::new(&path));

        // File doesn't exist: stability fails, no decode happens
        assert!(worker.run_once().await);
        assert!(worker.run_once().await);
        assert_eq!(codec.decode_calls(), 0);

        // File lands and stabilizes; the next round processes it
        std::fs::write(&path, b"now complete").unwrap();
        assert!(worker.run_once().await);
        assert_eq!(codec.decode_calls(), 1);
        assert_queue_empty(&mut worker).await;
    }

    #[tokio::test]
    async fn test_unsupported_extension_dropped_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layers.xcf");
        std::fs::write(&path, b"gimp project").unwrap();

        let codec = Arc::new(MockCodec::with_size(500, 400));
        let (mut worker, queue) = worker_with(Arc::clone(&codec));
        queue.push(Task::new(&path));

        assert!(worker.run_once().await);
        assert_eq!(codec.decode_calls(), 0);
        assert_queue_empty(&mut worker).await;
    }

    #[tokio::test]
    async fn test_requeued_task_waits_behind_pending_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jpg");
        let ready = dir.path().join("ready.jpg");
        std::fs::write(&ready, b"complete").unwrap();

        let codec = Arc::new(MockCodec::with_size(500, 400));
        let (mut worker, queue) = worker_with(Arc::clone(&codec));
        queue.push(Task::new(&missing));
        queue.push(Task::new(&ready));

        // Round 1: missing file requeued behind ready file
        assert!(worker.run_once().await);
        assert_eq!(codec.decode_calls(), 0);

        // Round 2: the ready file processes before the retry comes up again
        assert!(worker.run_once().await);
        assert_eq!(codec.decode_calls(), 1);
    }
}
