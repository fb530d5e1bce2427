//! Configuration types for azblob-dl
//!
//! Two kinds of configuration exist:
//! - Deployment settings (storage connection string, container, download folder)
//!   are looked up through [`Settings`] on every request and never cached.
//! - Server settings ([`Config`]) are resolved once at start-up.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;

/// App setting holding the storage account connection string
pub const CONNECTION_STRING_KEY: &str = "AZURE_VIDEO_STORAGE_CONNECTION_STRING";

/// App setting holding the blob container name
pub const CONTAINER_KEY: &str = "AZURE_VIDEO_STORAGE_BLOB_CONTAINER";

/// Environment variable holding the local/shared download folder
pub const DOWNLOAD_FOLDER_KEY: &str = "VIDEO_DOWNLOAD_FOLDER";

/// Port assigned by the Azure Functions host to a custom handler
pub const CUSTOM_HANDLER_PORT_KEY: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

/// Explicit bind address override (e.g., "0.0.0.0:8080")
pub const BIND_ADDRESS_KEY: &str = "AZBLOB_DL_BIND_ADDRESS";

/// Route segment override for the download trigger
pub const FUNCTION_NAME_KEY: &str = "AZBLOB_DL_FUNCTION_NAME";

/// Comma-separated CORS origins; any non-empty value enables the CORS layer
pub const CORS_ORIGINS_KEY: &str = "AZBLOB_DL_CORS_ORIGINS";

/// Serve Swagger UI when set to `true`/`1`, disable with `false`/`0`
pub const SWAGGER_UI_KEY: &str = "AZBLOB_DL_SWAGGER_UI";

/// String-keyed settings lookup
///
/// A missing key and an empty value are treated the same way by callers.
pub trait Settings: Send + Sync {
    /// Look up a setting by key
    fn get(&self, key: &str) -> Option<String>;

    /// Look up a setting, treating an empty value as absent
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

/// [`Settings`] backed by the process environment
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSettings;

impl Settings for EnvSettings {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Settings for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Connection details for the blob container, resolved per request
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage account connection string
    pub connection_string: String,
    /// Name of the container holding the blobs
    pub container_name: String,
}

impl StorageConfig {
    /// Read the storage settings, failing if either one is missing or empty
    pub fn from_settings(settings: &dyn Settings) -> Result<Self> {
        let connection_string = settings.get_non_empty(CONNECTION_STRING_KEY).ok_or_else(|| {
            Error::configuration_missing(
                CONNECTION_STRING_KEY,
                "Missing blob store connection string app setting",
            )
        })?;

        let container_name = settings.get_non_empty(CONTAINER_KEY).ok_or_else(|| {
            Error::configuration_missing(CONTAINER_KEY, "Missing blob container app settings")
        })?;

        Ok(Self {
            connection_string,
            container_name,
        })
    }
}

// The connection string carries the account key, keep it out of logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("connection_string", &"<redacted>")
            .field("container_name", &self.container_name)
            .finish()
    }
}

/// HTTP server settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API server binds to (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable the CORS layer (default: false)
    #[serde(default)]
    pub cors_enabled: bool,

    /// Allowed CORS origins ("*" allows any)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Serve Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: false,
            cors_origins: vec![],
            swagger_ui: false,
        }
    }
}

/// Top-level server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Route segment of the trigger, served at `/api/{function_name}`
    #[serde(default = "default_function_name")]
    pub function_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            function_name: default_function_name(),
        }
    }
}

impl Config {
    /// Build the server configuration from defaults plus overrides found in `settings`
    ///
    /// `AZBLOB_DL_BIND_ADDRESS` wins over `FUNCTIONS_CUSTOMHANDLER_PORT`; the
    /// latter binds to loopback since the Functions host proxies requests locally.
    pub fn from_settings(settings: &dyn Settings) -> Result<Self> {
        let mut config = Config::default();

        if let Some(port) = settings.get_non_empty(CUSTOM_HANDLER_PORT_KEY) {
            let port: u16 = port.trim().parse().map_err(|_| Error::Config {
                message: format!("invalid port '{}'", port),
                key: Some(CUSTOM_HANDLER_PORT_KEY.to_string()),
            })?;
            config.server.bind_address = SocketAddr::from(([127, 0, 0, 1], port));
        }

        if let Some(address) = settings.get_non_empty(BIND_ADDRESS_KEY) {
            config.server.bind_address = address.trim().parse().map_err(|_| Error::Config {
                message: format!("invalid bind address '{}'", address),
                key: Some(BIND_ADDRESS_KEY.to_string()),
            })?;
        }

        if let Some(name) = settings.get_non_empty(FUNCTION_NAME_KEY) {
            let name = name.trim_matches('/');
            if name.is_empty() || name.contains('/') {
                return Err(Error::Config {
                    message: format!("invalid function name '{}'", name),
                    key: Some(FUNCTION_NAME_KEY.to_string()),
                });
            }
            config.function_name = name.to_string();
        }

        if let Some(origins) = settings.get_non_empty(CORS_ORIGINS_KEY) {
            config.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
            config.server.cors_enabled = !config.server.cors_origins.is_empty();
        }

        if let Some(flag) = settings.get_non_empty(SWAGGER_UI_KEY) {
            config.server.swagger_ui = parse_flag(&flag).ok_or_else(|| Error::Config {
                message: format!("invalid boolean '{}'", flag),
                key: Some(SWAGGER_UI_KEY.to_string()),
            })?;
        }

        Ok(config)
    }

    /// Route path of the download trigger
    pub fn trigger_path(&self) -> String {
        format!("/api/{}", self.function_name)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_function_name() -> String {
    "lecture-video-download-fn".to_string()
}
