//! OpenAPI documentation
//!
//! Generated at compile time with utoipa and served at `/openapi.json`.

use crate::Config;
use utoipa::OpenApi;

/// Route the trigger is documented under before [`document_for`] relocates it
pub const DOCUMENTED_TRIGGER_PATH: &str = "/api/lecture-video-download-fn";

/// OpenAPI documentation for the azblob-dl HTTP API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "azblob-dl HTTP API",
        version = "0.1.0",
        description = "Starts background downloads of blobs from Azure Blob Storage into a local or shared folder",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        crate::api::routes::download_file,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    tags(
        (name = "download", description = "Download trigger"),
        (name = "system", description = "Health and documentation")
    )
)]
pub struct ApiDoc;

/// OpenAPI document with the trigger listed under the route `config` serves
pub fn document_for(config: &Config) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let trigger = config.trigger_path();
    if trigger != DOCUMENTED_TRIGGER_PATH {
        if let Some(item) = doc.paths.paths.remove(DOCUMENTED_TRIGGER_PATH) {
            doc.paths.paths.insert(trigger, item);
        }
    }
    doc
}
