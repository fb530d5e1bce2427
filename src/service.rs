//! Request handling: resolve, decide, and hand off to the scheduler

use crate::config::{DOWNLOAD_FOLDER_KEY, Settings};
use crate::download_task::{DownloadTask, target_path};
use crate::error::Result;
use crate::resolver::BlobResolver;
use crate::scheduler::TaskScheduler;
use crate::storage::BlobReference;
use crate::types::{SkipReason, Submission};
use std::sync::Arc;

/// Whether a found blob gets downloaded
#[derive(Debug)]
pub enum DownloadDecision {
    /// Queue this task
    Download(DownloadTask),
    /// Leave the blob alone
    Skip(SkipReason),
}

/// Composes blob resolution, the no-overwrite check and task submission
///
/// One instance is shared by every request; it owns the handle to the single
/// download worker.
pub struct DownloadService {
    resolver: BlobResolver,
    environment: Arc<dyn Settings>,
    scheduler: TaskScheduler,
}

impl DownloadService {
    /// Create the service
    ///
    /// `environment` supplies `VIDEO_DOWNLOAD_FOLDER`, read on every request.
    pub fn new(
        resolver: BlobResolver,
        environment: Arc<dyn Settings>,
        scheduler: TaskScheduler,
    ) -> Self {
        Self {
            resolver,
            environment,
            scheduler,
        }
    }

    /// The scheduler download tasks are submitted to
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Handle one trigger request for `file_name`
    ///
    /// Returns once the blob has been found and a task has been queued (or
    /// skipped); the transfer itself happens later on the worker.
    pub async fn start_download(&self, file_name: Option<&str>) -> Result<Submission> {
        let blob = self.resolver.resolve(file_name).await?;

        match self.decide(blob).await {
            DownloadDecision::Download(task) => {
                let target_path = task.target_path().to_path_buf();
                self.scheduler.submit(task);
                Ok(Submission::Queued { target_path })
            }
            DownloadDecision::Skip(reason) => Ok(Submission::Skipped { reason }),
        }
    }

    /// Decide whether `blob` needs downloading and build the task if so
    ///
    /// Not atomic: two concurrent requests for the same name can both see the
    /// target missing and both queue a task. The second transfer overwrites
    /// the first.
    pub async fn decide(&self, blob: Arc<dyn BlobReference>) -> DownloadDecision {
        let Some(folder) = self.environment.get_non_empty(DOWNLOAD_FOLDER_KEY) else {
            tracing::info!(
                setting = DOWNLOAD_FOLDER_KEY,
                "Skipping download as the download folder setting is missing"
            );
            return DownloadDecision::Skip(SkipReason::FolderNotConfigured);
        };

        let target_path = target_path(&folder, blob.name());

        // Matches the no-overwrite rule: anything unreadable is treated as absent
        if tokio::fs::try_exists(&target_path).await.unwrap_or(false) {
            tracing::info!(
                target_path = %target_path.display(),
                "Skipping download as target exists"
            );
            return DownloadDecision::Skip(SkipReason::AlreadyDownloaded { target_path });
        }

        tracing::info!(uri = %blob.uri(), "Creating the download task");
        DownloadDecision::Download(DownloadTask::new(blob, target_path))
    }
}
