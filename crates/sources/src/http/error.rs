//! HTTP source error types

/// HTTP source errors
#[derive(Debug, thiserror::Error)]
pub enum HttpSourceError {
    /// Failed to bind to address
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Server error while serving connections
    #[error("HTTP error: {0}")]
    Http(String),
}
