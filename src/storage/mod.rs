//! Blob storage capabilities
//!
//! The request path only needs four things from a blob: its name, its URI,
//! a live existence check and a whole-object download to a local file. These
//! are expressed as traits so the orchestration logic does not depend on the
//! wire protocol:
//! - [`BlobConnector`] builds a container client from a [`StorageConfig`]
//! - [`BlobContainer`] hands out references to named blobs
//! - [`BlobReference`] is the per-blob capability
//!
//! [`azure`] provides the production implementation on top of the Azure SDK.

use crate::config::StorageConfig;
use crate::error::StorageError;
use std::path::Path;
use std::sync::Arc;

pub mod azure;


pub use azure::{AzureBlob, AzureBlobConnector, AzureContainer};

/// A named object in a remote container
///
/// Constructing a reference never touches the network; existence is checked
/// live on every [`exists`](BlobReference::exists) call and never cached.
#[async_trait::async_trait]
pub trait BlobReference: Send + Sync {
    /// The blob name, used as the object key
    fn name(&self) -> &str;

    /// Fully-qualified remote location, for log and error messages
    fn uri(&self) -> &str;

    /// Check whether the blob exists in the remote container
    async fn exists(&self) -> Result<bool, StorageError>;

    /// Download the whole blob into `path`, creating or truncating the file
    async fn download_to_file(&self, path: &Path) -> Result<(), StorageError>;
}

/// A container-scoped client
pub trait BlobContainer: Send + Sync {
    /// URI of the container, for error messages
    fn uri(&self) -> &str;

    /// Get a reference to the blob called `name` (does not verify existence)
    fn blob(&self, name: &str) -> Arc<dyn BlobReference>;
}

/// Builds container clients from per-request storage settings
pub trait BlobConnector: Send + Sync {
    /// Create a client for the configured container
    fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn BlobContainer>, StorageError>;
}
