//! hookbus - Webhook to message bus bridge
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! hookbus
//! hookbus --config configs/hookbus.toml
//!
//! # Build every pipeline without serving
//! hookbus check --config configs/hookbus.toml
//! ```

mod app;
mod cmd;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hookbus_config::{Config, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// hookbus - Webhook to message bus bridge
#[derive(Parser, Debug)]
#[command(name = "hookbus")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server
    Serve,

    /// Load the configuration and construct every pipeline
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (level, format) = resolve_logging(cli.log_level.as_deref(), cli.config.as_deref());

    match cli.command {
        Some(Command::Check) => {
            // Check reports on stdout; only warnings go to the log
            init_logging("warn", format)?;
            cmd::check::run(cli.config).await
        }
        // No subcommand = run server (default behavior)
        Some(Command::Serve) | None => {
            init_logging(&level, format)?;
            cmd::serve::run(cli.config).await
        }
    }
}

/// Resolve log level and format: CLI flag > config file > default "info"
fn resolve_logging(cli_level: Option<&str>, config_path: Option<&Path>) -> (String, LogFormat) {
    let config = config_path
        .or_else(|| app::default_config_path())
        .filter(|path| path.exists())
        .and_then(|path| Config::from_file(path).ok());

    let format = config
        .as_ref()
        .map(|c| c.log.format)
        .unwrap_or_default();

    let level = match (cli_level, &config) {
        (Some(level), _) => level.to_string(),
        (None, Some(config)) => config.log.level.as_str().to_string(),
        (None, None) => "info".to_string(),
    };

    (level, format)
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let (console, json) = match format {
        LogFormat::Console => (
            Some(fmt::layer().with_target(true).with_thread_ids(false)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(json)
        .with(filter)
        .init();

    Ok(())
}
