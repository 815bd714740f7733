//! Assembly of the runtime graph from configuration
//!
//! One sink instance per distinct writer name, shared by every pipeline that
//! names it, and one pipeline per event path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use hookbus_config::Config;
use hookbus_format::FormatOptions;
use hookbus_pipeline::{Pipeline, PipelineContext};
use hookbus_sinks::{Sink, SinkSettings, sink_by_name};
use hookbus_template::ExtensionRegistry;

/// Locations searched when no `--config` is given
const DEFAULT_CONFIG_PATHS: &[&str] = &["configs/hookbus.toml", "hookbus.toml"];

/// First default config location that exists
pub fn default_config_path() -> Option<&'static Path> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
}

/// Load the configuration from `path`, or from a default location
pub fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = match path {
        Some(path) => {
            // User explicitly provided config path - must exist
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            path
        }
        None => default_config_path().with_context(|| {
            format!(
                "no config file given and none found at {}",
                DEFAULT_CONFIG_PATHS.join(", ")
            )
        })?,
    };

    let config = Config::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    Ok((config, path.to_path_buf()))
}

/// Create one sink per writer referenced by an event
pub fn build_sinks(config: &Config) -> Result<HashMap<String, Arc<dyn Sink>>> {
    let settings = SinkSettings {
        nats: config.nats.clone(),
        ..Default::default()
    };

    config
        .referenced_writers()
        .into_iter()
        .map(|name| {
            let sink = sink_by_name(name, &settings)
                .with_context(|| format!("failed to create writer '{}'", name))?;
            Ok((name.to_string(), sink))
        })
        .collect()
}

/// Construct every event pipeline; any failure is fatal
pub fn build_pipelines(
    config: &Config,
    sinks: &HashMap<String, Arc<dyn Sink>>,
) -> Result<HashMap<String, Arc<Pipeline>>> {
    let extensions = ExtensionRegistry::with_builtins();
    let formats = format_options(config);
    let ctx = PipelineContext {
        extensions: &extensions,
        formats: &formats,
        sinks,
    };

    config
        .events
        .iter()
        .map(|(path, event)| {
            let pipeline = Pipeline::from_config(path, event, &ctx)
                .with_context(|| format!("failed to build pipeline for event '{}'", path))?;
            Ok((path.clone(), Arc::new(pipeline)))
        })
        .collect()
}

fn format_options(config: &Config) -> FormatOptions {
    let mut options = FormatOptions::default();
    // Validation guarantees a single ASCII separator.
    if let Some(separator) = config.csv.separator_byte() {
        options.csv_separator = separator;
    }
    options
}
