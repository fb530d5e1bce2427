//! azblob-dl server entry point
//!
//! Reads all configuration from the environment, so it can run as an Azure
//! Functions custom handler or as a standalone service.

use azblob_dl::{
    AzureBlobConnector, BlobResolver, Config, DownloadService, EnvSettings, Settings,
    TaskScheduler,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> azblob_dl::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings: Arc<dyn Settings> = Arc::new(EnvSettings);
    let config = Arc::new(Config::from_settings(settings.as_ref())?);

    let resolver = BlobResolver::new(settings.clone(), Arc::new(AzureBlobConnector::new()));
    let service = Arc::new(DownloadService::new(
        resolver,
        settings,
        TaskScheduler::start(),
    ));

    azblob_dl::api::start_api_server(service, config, azblob_dl::shutdown_signal()).await
}
