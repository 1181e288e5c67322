//! Stratus CLI library
//!
//! This module contains the core CLI logic for the Stratus layout tool: read an
//! architecture from TOML, arrange it with a preset, and write the resulting
//! diagram back out as TOML.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use error_adapter::ErrorAdapter;

use std::{fs, str::FromStr};

use futures::executor::block_on;
use log::{debug, info};
use serde::Deserialize;

use stratus::{
    Arranger, PresetOptions, StratusError,
    config::AppConfig,
    model::{Connection, Diagram, Group, Service},
};

/// The architecture description read from the input file.
#[derive(Debug, Default, Deserialize)]
struct Architecture {
    #[serde(default)]
    services: Vec<Service>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    groups: Vec<Group>,
}

/// Run the Stratus CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `StratusError` for:
/// - File I/O errors
/// - Configuration loading errors and invalid flag values
/// - Malformed input files
pub fn run(args: &Args) -> Result<(), StratusError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing architecture"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let options = preset_options(&app_config, args)?;
    debug!(options:?; "Resolved preset options");

    let source = fs::read_to_string(&args.input)?;
    let architecture: Architecture =
        toml::from_str(&source).map_err(|err| StratusError::Input(err.to_string()))?;
    let diagram = Diagram::from_architecture(
        architecture.services,
        architecture.connections,
        architecture.groups,
    );

    let mut arranger = Arranger::new();
    let arranged = block_on(arranger.apply_preset(&diagram, &options));

    let output = toml::to_string_pretty(&arranged)
        .map_err(|err| StratusError::Io(std::io::Error::other(err)))?;
    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Diagram arranged successfully");

    Ok(())
}

/// Merges configured defaults with command-line overrides.
fn preset_options(config: &AppConfig, args: &Args) -> Result<PresetOptions, StratusError> {
    let mut options = config.layout().preset_options();
    if let Some(preset) = &args.preset {
        options = options.with_preset(parse_flag("preset", preset)?);
    }
    if let Some(engine) = &args.engine {
        options = options.with_engine(parse_flag("engine", engine)?);
    }
    if let Some(spacing) = &args.spacing {
        options = options.with_spacing(parse_flag("spacing", spacing)?);
    }
    if let Some(edge_style) = &args.edge_style {
        options = options.with_edge_style(parse_flag("edge style", edge_style)?);
    }
    if args.emphasize_primary_path {
        options = options.with_emphasize_primary_path(true);
    }
    Ok(options.with_selected_node_id(args.selected.clone()))
}

fn parse_flag<T>(name: &str, value: &str) -> Result<T, StratusError>
where
    T: FromStr<Err = &'static str>,
{
    value
        .parse()
        .map_err(|err| StratusError::Config(format!("{err} for --{name}: `{value}`")))
}
