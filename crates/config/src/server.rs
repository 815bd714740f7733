//! HTTP server and request capture settings

use serde::Deserialize;

/// Default maximum payload size (16MB)
const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// HTTP listener configuration
///
/// # Example
///
/// ```toml
/// [server]
/// address = "127.0.0.1"
/// port = 9000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port
    /// Default: 8080
    pub port: u16,

    /// Maximum request body size in bytes
    /// Default: 16MB
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: 8080,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Request capture for troubleshooting templates
///
/// When enabled, every inbound body is written to
/// `<directory>/<timestamp>_request.txt` before it is adapted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Default: false
    pub enabled: bool,

    /// Default: "debug"
    pub directory: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "debug".into(),
        }
    }
}
