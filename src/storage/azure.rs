//! Azure Blob Storage implementation of the storage capabilities
//!
//! Built on `azure_storage_blobs`. The connection string decides the endpoint
//! and the credentials:
//! - `UseDevelopmentStorage=true` targets the local emulator
//! - `BlobEndpoint` overrides the endpoint derived from `AccountName`
//! - `SharedAccessSignature` wins over `AccountKey`; with neither, requests
//!   are anonymous

use super::{BlobConnector, BlobContainer, BlobReference};
use crate::config::StorageConfig;
use crate::error::StorageError;
use azure_core::error::ErrorKind;
use azure_core::{ResponseBody, RetryOptions};
use azure_storage::{CloudLocation, ConnectionString, StorageCredentials};
use azure_storage_blobs::prelude::{BlobClient, ClientBuilder, ContainerClient};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

const DEFAULT_ENDPOINTS_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// [`BlobConnector`] for Azure Blob Storage
///
/// Requests are sent once: the SDK's retry policy is disabled, and no
/// timeout is configured.
#[derive(Clone, Debug, Default)]
pub struct AzureBlobConnector;

impl AzureBlobConnector {
    /// Create a connector
    pub fn new() -> Self {
        Self
    }
}

impl BlobConnector for AzureBlobConnector {
    fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn BlobContainer>, StorageError> {
        let client = client_builder(&config.connection_string)?
            .retry(RetryOptions::none())
            .container_client(config.container_name.as_str());
        Ok(Arc::new(AzureContainer::new(client)?))
    }
}

/// Turn a storage connection string into a client builder
///
/// Parse failures are reported without the SDK's message, which echoes the
/// whole string including secrets.
fn client_builder(connection_string: &str) -> Result<ClientBuilder, StorageError> {
    let parsed = ConnectionString::new(connection_string).map_err(|_| {
        StorageError::InvalidConnectionString(
            "expected ';'-separated Key=Value pairs with known keys".to_string(),
        )
    })?;

    if parsed.use_development_storage == Some(true) {
        return Ok(ClientBuilder::emulator());
    }

    let credentials = match (parsed.sas, parsed.account_name, parsed.account_key) {
        (None, None, Some(_)) => {
            return Err(StorageError::InvalidConnectionString(
                "AccountKey requires AccountName".to_string(),
            ));
        }
        (None, _, None) => StorageCredentials::anonymous(),
        _ => parsed.storage_credentials().map_err(|e| {
            StorageError::InvalidConnectionString(format!("unusable credentials ({})", e.kind()))
        })?,
    };

    let location = match (parsed.blob_endpoint, parsed.account_name) {
        (Some(endpoint), account) => CloudLocation::Custom {
            account: account.unwrap_or_default().to_string(),
            uri: endpoint.trim_end_matches('/').to_string(),
        },
        (None, Some(account)) => {
            let protocol = parsed
                .default_endpoints_protocol
                .as_ref()
                .map_or_else(|| DEFAULT_ENDPOINTS_PROTOCOL.to_string(), ToString::to_string);
            let suffix = parsed.endpoint_suffix.unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
            CloudLocation::Custom {
                account: account.to_string(),
                uri: format!("{}://{}.blob.{}", protocol, account, suffix),
            }
        }
        (None, None) => {
            return Err(StorageError::InvalidConnectionString(
                "neither AccountName nor BlobEndpoint is set".to_string(),
            ));
        }
    };

    Ok(ClientBuilder::with_location(location, credentials))
}

/// A container client for Azure Blob Storage
#[derive(Debug, Clone)]
pub struct AzureContainer {
    client: ContainerClient,
    uri: String,
}

impl AzureContainer {
    /// Wrap an SDK container client
    pub fn new(client: ContainerClient) -> Result<Self, StorageError> {
        let uri = client
            .url()
            .map_err(|e| StorageError::InvalidConnectionString(format!("invalid blob endpoint: {}", e)))?
            .to_string();
        Ok(Self { client, uri })
    }
}

impl BlobContainer for AzureContainer {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn blob(&self, name: &str) -> Arc<dyn BlobReference> {
        let client = self.client.blob_client(name);
        let uri = client
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}/{}", self.uri, name));

        Arc::new(AzureBlob {
            client,
            name: name.to_string(),
            uri,
        })
    }
}

/// Reference to a single blob in an [`AzureContainer`]
#[derive(Debug, Clone)]
pub struct AzureBlob {
    client: BlobClient,
    name: String,
    uri: String,
}

impl AzureBlob {
    fn service_error(&self, operation: &'static str, error: azure_core::Error) -> StorageError {
        match error.kind() {
            ErrorKind::HttpResponse { status, .. } => StorageError::Status {
                operation,
                uri: self.uri.clone(),
                status: u16::from(*status),
            },
            _ => StorageError::Request {
                operation,
                uri: self.uri.clone(),
                source: error,
            },
        }
    }

    async fn write_body(
        &self,
        file: &mut tokio::fs::File,
        mut body: ResponseBody,
    ) -> Result<u64, StorageError> {
        let mut written = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| self.service_error("download", e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}

#[async_trait::async_trait]
impl BlobReference for AzureBlob {
    fn name(&self) -> &str {
        &self.name
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    async fn exists(&self) -> Result<bool, StorageError> {
        self.client
            .exists()
            .await
            .map_err(|e| self.service_error("exists", e))
    }

    async fn download_to_file(&self, path: &Path) -> Result<(), StorageError> {
        let mut pages = self.client.get().into_stream();

        // The target is only created once the service has accepted the request
        let first = match pages.next().await {
            Some(page) => page.map_err(|e| self.service_error("download", e))?,
            None => {
                return Err(self.service_error(
                    "download",
                    azure_core::Error::message(ErrorKind::Other, "empty response stream"),
                ));
            }
        };

        let mut file = tokio::fs::File::create(path).await?;
        let mut written = self.write_body(&mut file, first.data).await?;

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| self.service_error("download", e))?;
            written += self.write_body(&mut file, page.data).await?;
        }
        file.flush().await?;

        tracing::debug!(uri = %self.uri, path = %path.display(), bytes = written, "Blob body written");
        Ok(())
    }
}
