//! Route handlers for the HTTP API
//!
//! - [`download`]: the download trigger
//! - [`system`]: health and OpenAPI

use serde::{Deserialize, Serialize};

mod download;
mod system;

pub use download::*;
pub use system::*;

/// Query parameters for the download trigger
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Name of the blob to download
    pub file: Option<String>,
}
