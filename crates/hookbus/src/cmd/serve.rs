//! Serve command - Run the webhook server

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hookbus_sinks::Sink;
use hookbus_sources::{HttpSource, HttpSourceConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::app;

/// Time allowed for in-flight requests after a shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the serve command
pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "hookbus starting"
    );

    let (config, path) = app::load_config(config_path.as_deref())?;
    info!(config = %path.display(), events = config.events.len(), "configuration loaded");

    if let Err(e) = run_server(config).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("hookbus shutdown complete");
    Ok(())
}

/// Main server run loop
async fn run_server(config: hookbus_config::Config) -> Result<()> {
    let sinks = app::build_sinks(&config)?;

    // A writer that is down at startup is retried on its first write
    for (name, sink) in &sinks {
        if let Err(e) = sink.connect().await {
            warn!(writer = %name, error = %e, "writer unavailable at startup, will retry on first write");
        }
    }

    let pipelines = app::build_pipelines(&config, &sinks)?;

    let cancel = CancellationToken::new();
    let source = HttpSource::new(
        HttpSourceConfig::from_config(&config.server, &config.debug),
        pipelines,
    );
    let mut server = tokio::spawn(source.run(cancel.clone()));

    info!(
        address = %config.server.bind_address(),
        writers = sinks.len(),
        "hookbus running"
    );

    let stopped = tokio::select! {
        _ = wait_for_shutdown() => None,
        joined = &mut server => Some(joined),
    };

    if let Some(joined) = stopped {
        close_sinks(&sinks).await;
        return joined
            .context("HTTP source task failed")?
            .context("HTTP source stopped");
    }

    info!("shutdown signal received, stopping server...");
    cancel.cancel();
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!(error = %e, "HTTP source stopped with an error"),
        Ok(Err(e)) => warn!(error = %e, "HTTP source task panicked during shutdown"),
        Err(_) => warn!("HTTP source did not finish within timeout, continuing shutdown"),
    }

    close_sinks(&sinks).await;
    Ok(())
}

async fn close_sinks(sinks: &HashMap<String, Arc<dyn Sink>>) {
    for (name, sink) in sinks {
        if let Err(e) = sink.close().await {
            warn!(writer = %name, error = %e, "failed to close writer");
        }
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
