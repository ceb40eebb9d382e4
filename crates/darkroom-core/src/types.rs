//! Core data types shared across the normalization pipeline.

use std::path::PathBuf;

use crate::error::PipelineError;

/// The unit of work: one candidate file plus its attempt counter.
///
/// `attempt` starts at 1 and is bumped each time the task is requeued after
/// instability or a processing failure. Once it reaches the configured
/// retry cap the task is dropped and the file is not retried until another
/// creation event arrives for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Absolute path to the candidate image file
    pub path: PathBuf,

    /// Attempt counter, starting at 1
    pub attempt: u32,
}

impl Task {
    /// Create a fresh task for a newly seen file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            attempt: 1,
        }
    }

    /// The successor task queued after a retryable failure.
    ///
    /// The counter is bumped exactly once per failed round, whether the
    /// failure was instability or a processing error.
    pub fn next_attempt(&self) -> Self {
        Self {
            path: self.path.clone(),
            attempt: self.attempt + 1,
        }
    }
}

/// What happened to a successfully processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalization {
    /// Already within bounds and not HEIF; nothing was written
    Skipped { width: u32, height: u32 },

    /// Resized and rewritten in place, preserving the source format
    Resized { from: (u32, u32), to: (u32, u32) },

    /// HEIF source converted to a sibling `.jpg`; original removed
    Converted { output: PathBuf, resized: bool },
}

/// Per-task result consumed by the worker loop.
///
/// Replaces catch-all error capture around the loop body: the worker
/// applies the requeue-or-drop decision explicitly per variant.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Task finished; the file needs no further processing
    Completed(Normalization),

    /// Retryable failure; requeue while the attempt budget lasts
    Retry(PipelineError),

    /// Permanent failure; drop without requeueing
    Fatal(PipelineError),
}
