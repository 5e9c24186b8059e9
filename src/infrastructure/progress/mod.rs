// ============================================================
// PROGRESS SIDE FILE
// ============================================================
// Best-effort status text polled by an external watcher. No locking: two
// runs on the same input and run id overwrite each other's file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

pub fn processing_message(current: usize, total: usize) -> String {
    format!("Processing {} of {} records...", current, total)
}

pub fn finished_message(modified: usize) -> String {
    format!("Inference finished. {} records modified.", modified)
}

/// Status sink driven by the batch classifier.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    fn report(&self, current: usize, total: usize);

    fn report_done(&self, modified: usize);

    /// Wait out the grace period, then remove the marker.
    async fn cleanup(&self);
}

/// Writes the marker to a plain text file next to the dataset.
pub struct FileProgressReporter {
    path: PathBuf,
    grace_period: Duration,
}

impl FileProgressReporter {
    pub fn new(path: PathBuf, grace_period: Duration) -> Self {
        Self { path, grace_period }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, message: &str) {
        if let Err(e) = std::fs::write(&self.path, message) {
            debug!(path = %self.path.display(), error = %e, "Failed to write progress file");
        }
    }
}

#[async_trait]
impl ProgressSink for FileProgressReporter {
    fn report(&self, current: usize, total: usize) {
        self.write(&processing_message(current, total));
    }

    fn report_done(&self, modified: usize) {
        self.write(&finished_message(modified));
    }

    async fn cleanup(&self) {
        if !self.grace_period.is_zero() {
            tokio::time::sleep(self.grace_period).await;
        }
        let _ = tokio::fs::remove_file(&self.path).await;
    }
}
