//! The producer/consumer normalization pipeline.
//!
//! - **stability**: size-polling detector for fully written files
//! - **queue**: shared FIFO between producers and the single worker
//! - **scanner**: one-shot seeding of pre-existing files
//! - **normalize**: the transform policy (bound check, resize, conversion)
//! - **worker**: the consumer loop with bounded-retry requeue

pub mod normalize;
pub mod queue;
pub mod scanner;
pub mod stability;
pub mod worker;

// Re-exports for convenient access
pub use normalize::{fit_within, Normalizer};
pub use queue::{task_queue, TaskQueue, TaskReceiver};
pub use scanner::Scanner;
pub use stability::StabilityChecker;
pub use worker::Worker;
