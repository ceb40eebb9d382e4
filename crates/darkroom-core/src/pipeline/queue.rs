//! The shared work queue between event producers and the worker.

use tokio::sync::mpsc;

use crate::types::Task;

/// Cloneable push handle. Held by the scanner, the event bridge and the
/// worker itself (for requeues); all pushes land at the back of the FIFO.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
}

/// Single-consumer pop side, owned by the worker.
pub struct TaskReceiver {
    rx: mpsc::UnboundedReceiver<Task>,
}

/// Create a connected queue pair.
///
/// Unbounded by design: producers are bursty (initial scan, event storms)
/// and must never block, while the single worker drains at its own pace.
pub fn task_queue() -> (TaskQueue, TaskReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskQueue { tx }, TaskReceiver { rx })
}

impl TaskQueue {
    /// Push a task onto the back of the queue.
    ///
    /// A send failure means the worker is gone, which only happens during
    /// process shutdown; the task is intentionally abandoned then.
    pub fn push(&self, task: Task) {
        if self.tx.send(task).is_err() {
            tracing::debug!("Task queue closed; dropping task");
        }
    }
}

impl TaskReceiver {
    /// Pop the next task, waiting cooperatively while the queue is empty.
    ///
    /// Returns `None` once every push handle has been dropped.
    pub async fn pop(&mut self) -> Option<Task> {
        self.rx.recv().await
    }
}
