//! Blob resolution: file name to an existing blob reference

use crate::config::{Settings, StorageConfig};
use crate::error::{Error, Result};
use crate::storage::{BlobConnector, BlobReference};
use std::sync::Arc;

/// Turns a requested file name into a reference to a blob that exists
///
/// Storage settings are read on every call, so configuration changes take
/// effect without a restart.
pub struct BlobResolver {
    settings: Arc<dyn Settings>,
    connector: Arc<dyn BlobConnector>,
}

impl BlobResolver {
    /// Create a resolver reading app settings from `settings`
    pub fn new(settings: Arc<dyn Settings>, connector: Arc<dyn BlobConnector>) -> Self {
        Self {
            settings,
            connector,
        }
    }

    /// Resolve `file_name` to an existing blob
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if the name is missing, empty, or has `.`/`..` segments
    /// - [`Error::ConfigurationMissing`] if the connection string or container is unset
    /// - [`Error::NotFound`] if the blob does not exist
    /// - [`Error::Storage`] if the connection string is invalid or the existence check fails
    pub async fn resolve(&self, file_name: Option<&str>) -> Result<Arc<dyn BlobReference>> {
        let file_name = file_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::InvalidRequest("Missing file name".to_string()))?;
        check_segments(file_name)?;

        let config = StorageConfig::from_settings(self.settings.as_ref())?;
        let container = self.connector.connect(&config)?;
        let blob = container.blob(file_name);

        if !blob.exists().await? {
            return Err(Error::NotFound {
                name: file_name.to_string(),
                container_uri: container.uri().to_string(),
            });
        }

        tracing::debug!(uri = %blob.uri(), "Resolved blob");
        Ok(blob)
    }
}

/// Reject names with relative segments
///
/// Blob URLs drop `.` and `..` segments while the local target path keeps
/// them, so such a name would check one blob and write outside the folder.
fn check_segments(file_name: &str) -> Result<()> {
    let relative = file_name
        .split(|c| c == '/' || std::path::is_separator(c))
        .any(|segment| segment == "." || segment == "..");

    if relative {
        return Err(Error::InvalidRequest(format!(
            "Invalid file name '{}'",
            file_name
        )));
    }
    Ok(())
}
