//! HTTP source configuration

use std::path::PathBuf;

use hookbus_config::{DebugConfig, ServerConfig};

/// Default HTTP port
const DEFAULT_PORT: u16 = 8080;

/// Default maximum payload size (16MB)
const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// HTTP source configuration
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub address: String,

    /// Listen port
    pub port: u16,

    /// Maximum request payload size in bytes
    pub max_payload_size: usize,

    /// Directory receiving a copy of every request body (None = disabled)
    pub capture_directory: Option<PathBuf>,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            capture_directory: None,
        }
    }
}

impl HttpSourceConfig {
    /// Build from the `[server]` and `[debug]` sections
    pub fn from_config(server: &ServerConfig, debug: &DebugConfig) -> Self {
        Self {
            address: server.address.clone(),
            port: server.port,
            max_payload_size: server.max_payload_size,
            capture_directory: debug.enabled.then(|| PathBuf::from(&debug.directory)),
        }
    }

    /// Create config with custom port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
