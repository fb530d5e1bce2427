//! Download task: one blob transferred to one local path

use crate::storage::BlobReference;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

/// Join the download folder and a blob name into the local target path
///
/// A separator is inserted only if `folder` does not already end with one.
/// The blob name is appended verbatim, so names containing '/' address
/// subdirectories of the folder.
pub fn target_path(folder: &str, blob_name: &str) -> PathBuf {
    let mut target = String::with_capacity(folder.len() + blob_name.len() + 1);
    target.push_str(folder);
    if !folder.ends_with(std::path::is_separator) {
        target.push(std::path::MAIN_SEPARATOR);
    }
    target.push_str(blob_name);
    PathBuf::from(target)
}

/// A single fire-and-forget blob transfer
///
/// Immutable once built. Executing consumes the task, so each task runs at
/// most once.
pub struct DownloadTask {
    blob: Arc<dyn BlobReference>,
    target_path: PathBuf,
    span: tracing::Span,
}

impl DownloadTask {
    /// Bind `blob` to `target_path`
    ///
    /// The task's span is created here, as a child of whatever span is current,
    /// so its log records stay attached to the request that created it.
    pub fn new(blob: Arc<dyn BlobReference>, target_path: PathBuf) -> Self {
        let span = tracing::info_span!(
            "download_task",
            blob = %blob.name(),
            target_path = %target_path.display()
        );
        Self {
            blob,
            target_path,
            span,
        }
    }

    /// The remote blob being downloaded
    pub fn blob(&self) -> &Arc<dyn BlobReference> {
        &self.blob
    }

    /// The local destination
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Run the transfer
    ///
    /// Never fails: the result is only logged. A failed transfer may leave a
    /// partially written file at the target path.
    pub async fn execute(self) {
        let span = self.span.clone();
        self.run().instrument(span).await
    }

    async fn run(self) {
        tracing::info!(uri = %self.blob.uri(), "Starting download");

        match self.blob.download_to_file(&self.target_path).await {
            Ok(()) => {
                tracing::info!(
                    target_path = %self.target_path.display(),
                    "Successful download"
                );
            }
            Err(e) => {
                tracing::error!(
                    uri = %self.blob.uri(),
                    error = %e,
                    error_kind = e.kind(),
                    "Failed download"
                );
            }
        }
    }
}

impl std::fmt::Debug for DownloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadTask")
            .field("uri", &self.blob.uri())
            .field("target_path", &self.target_path)
            .finish()
    }
}
