//! Application state for the API server

use crate::{Config, DownloadService};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request (cheap Arc clones); every request goes through the same
/// [`DownloadService`] and therefore the same download worker.
#[derive(Clone)]
pub struct AppState {
    /// The download orchestration service
    pub service: Arc<DownloadService>,

    /// Server configuration; decides the trigger route listed in the OpenAPI document
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<DownloadService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }
}
