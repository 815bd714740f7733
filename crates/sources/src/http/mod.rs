//! HTTP Source - webhook receiver
//!
//! Accepts `POST` requests and hands the body to the pipeline configured
//! for the request path.
//!
//! # Routing
//!
//! ```text
//! POST /orders ──→ pipelines["/orders"].adapt(body) ──→ 200 ok
//! ```
//!
//! | Condition | Status |
//! |-----------|--------|
//! | method other than POST | 405 |
//! | no event for the path | 404 |
//! | body larger than `max_payload_size` | 413 |
//! | adapted | 200 |
//! | malformed or empty payload | 400 |
//! | template render failure | 422 |
//! | unsupported event configuration | 501 |
//! | other failure | 500 |
//!
//! Sink write failures are logged by the pipeline and do not change the
//! response.

mod capture;
mod config;
mod error;
mod handlers;
mod metrics;
mod response;

#[cfg(test)]
mod http_test;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use hookbus_pipeline::Pipeline;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use capture::BodyCapture;
pub use config::HttpSourceConfig;
pub use error::HttpSourceError;
pub use metrics::{HttpMetricsSnapshot, HttpSourceMetrics};
pub use response::status_for;

use handlers::{HandlerState, dispatch};

/// HTTP source serving every configured event
pub struct HttpSource {
    config: HttpSourceConfig,
    pipelines: HashMap<String, Arc<Pipeline>>,
    metrics: Arc<HttpSourceMetrics>,
    running: Arc<AtomicBool>,
}

impl HttpSource {
    /// Create a new HTTP source; `pipelines` is keyed by event path
    pub fn new(config: HttpSourceConfig, pipelines: HashMap<String, Arc<Pipeline>>) -> Self {
        Self {
            config,
            pipelines,
            metrics: Arc::new(HttpSourceMetrics::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &HttpSourceMetrics {
        &self.metrics
    }

    /// Check if the source is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Build the axum router without binding a listener
    pub fn router(&self) -> Router {
        let state = Arc::new(HandlerState {
            pipelines: self.pipelines.clone(),
            metrics: Arc::clone(&self.metrics),
            capture: self.config.capture_directory.clone().map(BodyCapture::new),
        });
        build_router(state, self.config.max_payload_size)
    }

    /// Run the HTTP source
    ///
    /// Binds to the configured address and serves requests until `cancel`
    /// fires. In-flight requests are allowed to finish.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), HttpSourceError> {
        let bind_addr = self.config.bind_address();

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| HttpSourceError::Bind {
                address: bind_addr.clone(),
                source: e,
            })?;

        self.running.store(true, Ordering::Relaxed);

        let mut paths: Vec<&str> = self.pipelines.keys().map(String::as_str).collect();
        paths.sort_unstable();
        tracing::info!(
            address = %bind_addr,
            events = ?paths,
            capture = ?self.config.capture_directory,
            "HTTP source listening"
        );

        let app = self.router();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel))
            .await
            .map_err(|e| HttpSourceError::Http(e.to_string()));

        self.running.store(false, Ordering::Relaxed);

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            requests_received = snapshot.requests_received,
            requests_accepted = snapshot.requests_accepted,
            requests_rejected = snapshot.requests_rejected,
            "HTTP source stopped"
        );

        result
    }
}

/// Build the axum router
fn build_router(state: Arc<HandlerState>, max_payload_size: usize) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_payload_size))
}

/// Shutdown signal future
async fn shutdown_signal(cancel: CancellationToken) {
    cancel.cancelled().await;
}
