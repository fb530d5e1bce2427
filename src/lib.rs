//! # azblob-dl
//!
//! HTTP-triggered background downloader for Azure Blob Storage.
//!
//! A `GET /api/lecture-video-download-fn?file=<name>` request checks that the
//! blob exists, and unless the file is already present in the configured
//! download folder, queues a transfer on a single background worker. The
//! response is sent immediately; the transfer result only shows up in logs.
//!
//! ## Flow
//!
//! 1. [`BlobResolver`] reads the storage settings and checks that the blob exists
//! 2. [`DownloadService`] checks `VIDEO_DOWNLOAD_FOLDER` and the local target path
//! 3. [`TaskScheduler`] runs queued [`DownloadTask`]s one at a time, in order
//!
//! ## Quick Start
//!
//! ```no_run
//! use azblob_dl::{
//!     AzureBlobConnector, BlobResolver, Config, DownloadService, EnvSettings, TaskScheduler,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Arc::new(EnvSettings);
//!     let resolver = BlobResolver::new(settings.clone(), Arc::new(AzureBlobConnector::new()));
//!     let service = DownloadService::new(resolver, settings, TaskScheduler::start());
//!
//!     let submission = service.start_download(Some("lec1.mp4")).await?;
//!     println!("{:?}", submission);
//!
//!     // Let the worker finish before the runtime shuts down
//!     service.scheduler().wait_idle().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP trigger and operational endpoints
pub mod api;
/// Configuration types and settings lookup
pub mod config;
/// Download task and target path construction
pub mod download_task;
/// Error types
pub mod error;
/// Blob resolution
pub mod resolver;
/// Single-worker task scheduler
pub mod scheduler;
/// Request orchestration
pub mod service;
/// Blob storage capabilities and the Azure implementation
pub mod storage;
/// Core types
pub mod types;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, EnvSettings, ServerConfig, Settings, StorageConfig};
pub use download_task::{DownloadTask, target_path};
pub use error::{Error, Result, StorageError};
pub use resolver::BlobResolver;
pub use scheduler::TaskScheduler;
pub use service::{DownloadDecision, DownloadService};
pub use storage::{AzureBlobConnector, BlobConnector, BlobContainer, BlobReference};
pub use types::{DOWNLOAD_STARTED_MESSAGE, Outcome, SkipReason, Submission};

/// Resolve when the process is asked to stop.
///
/// Waits for Ctrl+C everywhere, and for SIGTERM on Unix as well (the Functions
/// host stops custom handlers with SIGTERM). A signal whose handler cannot be
/// installed is logged and ignored. Pass this as the `shutdown` argument of
/// [`api::start_api_server`].
pub async fn shutdown_signal() {
    tokio::select! {
        _ = interrupt() => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate() => tracing::info!("Received SIGTERM, shutting down"),
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
