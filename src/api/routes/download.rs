//! Download trigger handler.

use super::DownloadQuery;
use crate::api::AppState;
use crate::types::{Outcome, Submission};
use axum::extract::{Query, State};

/// GET /api/{function_name} - Start a background download
///
/// Responds as soon as the blob has been found; the caller never learns
/// whether the transfer itself succeeds.
#[utoipa::path(
    get,
    path = "/api/lecture-video-download-fn",
    tag = "download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Download queued or skipped", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or invalid file name, missing configuration or storage failure", body = String, content_type = "text/plain"),
        (status = 404, description = "Blob not found in the container", body = String, content_type = "text/plain")
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Outcome {
    let result = state.service.start_download(query.file.as_deref()).await;

    match &result {
        Ok(Submission::Queued { target_path }) => {
            tracing::debug!(target_path = %target_path.display(), "Download queued");
        }
        Ok(Submission::Skipped { reason }) => {
            tracing::debug!(?reason, "Download skipped");
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "Download request rejected");
        }
    }

    Outcome::from(result)
}
