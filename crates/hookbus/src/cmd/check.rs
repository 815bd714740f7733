//! Check command - Validate configuration and templates without serving

use std::path::PathBuf;

use anyhow::Result;
use hookbus_format::InputMode;
use hookbus_pipeline::Pipeline;

use crate::app;

/// Run the check command
pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let (config, path) = app::load_config(config_path.as_deref())?;
    let sinks = app::build_sinks(&config)?;
    let pipelines = app::build_pipelines(&config, &sinks)?;

    println!("{}: {} event(s) ok", path.display(), pipelines.len());

    let mut paths: Vec<&String> = pipelines.keys().collect();
    paths.sort();
    for event_path in paths {
        let event = &config.events[event_path];
        println!(
            "  {:<24} {:<5} -> {:<7} {} ({})",
            event_path,
            event.input_format,
            event.output_writer,
            event.output_template,
            describe(&pipelines[event_path]),
        );
    }
    Ok(())
}

fn describe(pipeline: &Pipeline) -> &'static str {
    let policy = pipeline.policy();
    match (policy.input, policy.single_output) {
        (InputMode::Single, true) => "one in, one out",
        (InputMode::Many, true) => "many in, one out",
        (InputMode::Many, false) => "one out per record",
        (InputMode::Single, false) => "chroot",
    }
}
