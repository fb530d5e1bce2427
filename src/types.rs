//! Core request outcome types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body returned with every accepted request
pub const DOWNLOAD_STARTED_MESSAGE: &str = "File download started";

/// What the request handler did after the blob was found
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Submission {
    /// A download task was handed to the scheduler
    Queued {
        /// Local path the blob will be written to
        target_path: PathBuf,
    },
    /// No task was created
    Skipped {
        /// Why the download was skipped
        reason: SkipReason,
    },
}

/// Reason a download was not scheduled for an existing blob
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// `VIDEO_DOWNLOAD_FOLDER` is unset or empty
    FolderNotConfigured,
    /// The target path already exists locally
    AlreadyDownloaded {
        /// The existing local file
        target_path: PathBuf,
    },
}

/// Terminal classification of a trigger request
///
/// Never reflects the result of the transfer itself, which runs after the
/// response has been sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The blob exists; a download was queued or skipped
    Started,
    /// The blob does not exist
    NotFound(String),
    /// Invalid request, missing configuration or storage failure
    Error(String),
}

impl Outcome {
    /// HTTP status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Started => 200,
            Outcome::NotFound(_) => 404,
            Outcome::Error(_) => 400,
        }
    }

    /// Plain-text body reported to the caller
    pub fn message(&self) -> &str {
        match self {
            Outcome::Started => DOWNLOAD_STARTED_MESSAGE,
            Outcome::NotFound(message) | Outcome::Error(message) => message,
        }
    }
}

impl From<Error> for Outcome {
    fn from(error: Error) -> Self {
        match error {
            Error::NotFound { .. } => Outcome::NotFound(error.to_string()),
            other => Outcome::Error(other.to_string()),
        }
    }
}

impl From<Result<Submission>> for Outcome {
    fn from(result: Result<Submission>) -> Self {
        match result {
            Ok(_) => Outcome::Started,
            Err(e) => e.into(),
        }
    }
}
