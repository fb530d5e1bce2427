//! Error types for azblob-dl
//!
//! Errors fall into two phases:
//! - Resolution-phase errors ([`Error`]) happen while a request is being handled
//!   and are reported back to the caller.
//! - Transfer-phase errors ([`StorageError`] raised inside a background download)
//!   are only ever logged, never surfaced to the caller.

use thiserror::Error;

/// Result type alias for azblob-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for azblob-dl
#[derive(Debug, Error)]
pub enum Error {
    /// The request was missing its file name (or it was empty)
    #[error("{0}")]
    InvalidRequest(String),

    /// A required app setting is missing or empty
    #[error("{message}")]
    ConfigurationMissing {
        /// The setting key that was missing (e.g., "AZURE_VIDEO_STORAGE_BLOB_CONTAINER")
        key: String,
        /// Human-readable error message
        message: String,
    },

    /// A server setting is present but malformed
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The setting key that caused the error
        key: Option<String>,
    },

    /// The requested blob does not exist in the container
    #[error("'{name}' not found @ '{container_uri}'")]
    NotFound {
        /// The requested blob name
        name: String,
        /// URI of the container that was searched
        container_uri: String,
    },

    /// Blob service or connection string error
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Build a [`Error::ConfigurationMissing`] for the given setting key
    pub fn configuration_missing(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigurationMissing {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code, used in log records
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::ConfigurationMissing { .. } => "configuration_missing",
            Error::Config { .. } => "config_error",
            Error::NotFound { .. } => "not_found",
            Error::Storage(e) => e.kind(),
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

/// Errors raised by the blob storage client
#[derive(Debug, Error)]
pub enum StorageError {
    /// The connection string could not be parsed or is incomplete
    #[error("invalid storage connection string: {0}")]
    InvalidConnectionString(String),

    /// The blob service answered with an unexpected status
    #[error("{operation} for '{uri}' returned HTTP {status}")]
    Status {
        /// The blob operation (e.g., "exists", "download")
        operation: &'static str,
        /// The blob URI the request targeted
        uri: String,
        /// HTTP status code returned by the service
        status: u16,
    },

    /// The request could not be sent, or its response could not be read
    #[error("{operation} request for '{uri}' failed: {source}")]
    Request {
        /// The blob operation (e.g., "exists", "download")
        operation: &'static str,
        /// The blob URI the request targeted
        uri: String,
        /// Underlying SDK error
        #[source]
        source: azure_core::Error,
    },

    /// Writing the downloaded content to the local filesystem failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Stable name of the concrete failure kind, logged alongside transfer failures
    pub fn kind(&self) -> &'static str {
        use azure_core::error::ErrorKind;

        match self {
            StorageError::InvalidConnectionString(_) => "invalid_connection_string",
            StorageError::Status { status: 401 | 403, .. } => "permission_denied",
            StorageError::Status { status: 404, .. } => "blob_not_found",
            StorageError::Status { .. } => "unexpected_status",
            StorageError::Request { source, .. } => match source.kind() {
                ErrorKind::Io => "transport_error",
                ErrorKind::Credential => "credential_error",
                ErrorKind::DataConversion => "invalid_response",
                _ => "request_error",
            },
            StorageError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                "permission_denied"
            }
            StorageError::Io(_) => "io_error",
        }
    }
}
