//! Single-worker task scheduler
//!
//! Download tasks are executed one at a time, in submission order, on one
//! background worker that lives as long as the runtime. Submitting never
//! waits for the task, and nothing a task does (fail or panic) reaches the
//! submitter or stops the worker.

use crate::download_task::DownloadTask;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, oneshot};

/// Work items consumed by the worker loop
enum Job {
    Download(DownloadTask),
    /// Signalled once every job queued before it has finished
    Barrier(oneshot::Sender<()>),
}

/// FIFO scheduler backed by a single background worker
///
/// Cloning yields another handle to the same queue and worker.
#[derive(Clone, Debug)]
pub struct TaskScheduler {
    tx: mpsc::UnboundedSender<Job>,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Download(task) => f.debug_tuple("Download").field(task).finish(),
            Job::Barrier(_) => f.write_str("Barrier"),
        }
    }
}

impl TaskScheduler {
    /// Spawn the worker and return a handle to its queue
    ///
    /// Must be called from within a Tokio runtime. The worker is never torn
    /// down explicitly; it exits when the runtime shuts down or every handle
    /// has been dropped. Queued tasks are lost at that point.
    pub fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx));
        Self { tx }
    }

    /// Queue `task` for execution and return immediately
    pub fn submit(&self, task: DownloadTask) {
        tracing::debug!(?task, "Queueing download task");
        if let Err(mpsc::error::SendError(job)) = self.tx.send(Job::Download(task)) {
            tracing::error!(?job, "Download worker is gone, task dropped");
        }
    }

    /// Wait until every task submitted before this call has finished
    pub async fn wait_idle(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Barrier(done_tx)).is_ok() {
            // An error means the worker stopped, so there is nothing left to wait for.
            let _ = done_rx.await;
        }
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<Job>) {
    tracing::debug!("Download worker started");

    while let Some(job) = rx.recv().await {
        match job {
            Job::Download(task) => {
                let uri = task.blob().uri().to_string();
                if AssertUnwindSafe(task.execute()).catch_unwind().await.is_err() {
                    tracing::error!(uri = %uri, "Download task panicked");
                }
            }
            Job::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Download worker stopped");
}
