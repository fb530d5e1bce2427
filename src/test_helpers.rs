//! Shared test helpers for building a DownloadService over in-memory storage.

use crate::config::{CONNECTION_STRING_KEY, CONTAINER_KEY, DOWNLOAD_FOLDER_KEY, Settings};
use crate::storage::test_helpers::{MockBlob, MockConnector, MockContainer};
use crate::{BlobResolver, DownloadService, TaskScheduler};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

pub(crate) struct TestService {
    pub service: Arc<DownloadService>,
    pub connector: Arc<MockConnector>,
}

impl TestService {
    /// Number of transfers started for the blob called `name`
    pub fn downloads(&self, name: &str) -> usize {
        self.connector
            .container()
            .get(name)
            .download_calls
            .load(Ordering::SeqCst)
    }
}

/// Build a service whose container holds `blobs` and whose download folder is `folder`
///
/// Storage settings are always present; pass `folder: None` to leave
/// `VIDEO_DOWNLOAD_FOLDER` unset.
pub(crate) fn create_test_service(blobs: Vec<MockBlob>, folder: Option<&str>) -> TestService {
    let settings: Arc<dyn Settings> = Arc::new(HashMap::from([
        (
            CONNECTION_STRING_KEY.to_string(),
            "test_conn_string".to_string(),
        ),
        (CONTAINER_KEY.to_string(), "mediabackup".to_string()),
    ]));

    let mut environment = HashMap::new();
    if let Some(folder) = folder {
        environment.insert(DOWNLOAD_FOLDER_KEY.to_string(), folder.to_string());
    }

    let connector = Arc::new(MockConnector::new(MockContainer::new(blobs)));
    let resolver = BlobResolver::new(settings, connector.clone());
    let service = Arc::new(DownloadService::new(
        resolver,
        Arc::new(environment),
        TaskScheduler::start(),
    ));

    TestService { service, connector }
}
