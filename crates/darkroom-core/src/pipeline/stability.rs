//! File stability detection by size polling.

use std::path::Path;
use std::time::Duration;

use crate::config::StabilityConfig;

/// Polls a file's size until it stops changing.
///
/// Distinguishes a fully written file from one still being copied: a file is
/// stable once two consecutive samples agree on a nonzero size. Stat errors
/// (including "not found") are transient; the sample is skipped and the loop
/// keeps going until the retry budget runs out.
pub struct StabilityChecker {
    retries: u32,
    interval: Duration,
}

impl StabilityChecker {
    /// Create a checker with the given poll budget.
    pub fn new(config: &StabilityConfig) -> Self {
        Self {
            retries: config.retries,
            interval: config.interval(),
        }
    }

    /// Wait until the file's size stabilizes.
    ///
    /// Returns `true` as soon as two consecutive samples are equal and
    /// strictly positive, `false` once the budget is exhausted.
    pub async fn wait_for_stability(&self, path: &Path) -> bool {
        let mut last_size: Option<u64> = None;
        for _ in 0..self.retries {
            if let Ok(meta) = std::fs::metadata(path) {
                let size = meta.len();
                if last_size == Some(size) && size > 0 {
                    return true;
                }
                last_size = Some(size);
            }
            tokio::time::sleep(self.interval).await;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn checker(retries: u32, interval_ms: u64) -> StabilityChecker {
        StabilityChecker::new(&StabilityConfig {
            retries,
            interval_ms,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_stable_file_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.jpg");
        std::fs::write(&path, b"finished content").unwrap();

        assert!(checker(10, 100).wait_for_stability(&path).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_file_exhausts_full_budget() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never_appears.jpg");

        let start = tokio::time::Instant::now();
        let stable = checker(10, 100).wait_for_stability(&path).await;
        let elapsed = start.elapsed();

        assert!(!stable);
        // One sleep per sample, even for failed stats
        assert_eq!(elapsed, Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_file_never_stabilizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        assert!(!checker(5, 100).wait_for_stability(&path).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_growing_file_stabilizes_after_writes_stop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incoming.jpg");
        std::fs::write(&path, b"").unwrap();

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            // Two delayed appends, then the writer goes quiet
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut f = std::fs::OpenOptions::new()
                .append(true)
                .open(&writer_path)
                .unwrap();
            f.write_all(&[0u8; 10]).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            f.write_all(&[0u8; 10]).unwrap();
        });

        let stable = checker(10, 100).wait_for_stability(&path).await;
        writer.await.unwrap();

        assert!(stable);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 20);
    }
}
