//! Configuration file loading for the CLI
//!
//! The CLI looks for a TOML configuration file in a fixed order of locations
//! and falls back to [`AppConfig::default`] when none exists. Command-line flags
//! are applied on top of whatever is loaded here.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use stratus::{StratusError, config::AppConfig};

/// Configuration file looked up relative to the working directory.
const LOCAL_CONFIG: &str = "stratus/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for StratusError {
    fn from(err: ConfigError) -> Self {
        StratusError::Config(err.to_string())
    }
}

/// Where a configuration file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    Explicit,
    Local,
    System,
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (stratus/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, StratusError> {
    // 1. An explicit path never falls through to the other locations
    if let Some(path) = explicit_path {
        return load_config_file(path.as_ref(), ConfigSource::Explicit);
    }

    // 2. and 3. The first implicit location holding a file wins
    let found = implicit_locations()
        .into_iter()
        .find(|(_, path)| path.exists());
    if let Some((source, path)) = found {
        return load_config_file(&path, source);
    }

    // 4. Nothing on disk
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Implicit configuration locations in lookup order.
fn implicit_locations() -> Vec<(ConfigSource, PathBuf)> {
    let mut locations = vec![(ConfigSource::Local, PathBuf::from(LOCAL_CONFIG))];
    match ProjectDirs::from("com", "stratus", "stratus") {
        Some(dirs) => {
            let system_config = dirs.config_dir().join("config.toml");
            debug!(path = system_config.display().to_string(); "System configuration location");
            locations.push((ConfigSource::System, system_config));
        }
        None => debug!("Could not determine platform-specific config directory"),
    }
    locations
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: &Path, source: ConfigSource) -> Result<AppConfig, StratusError> {
    info!(path = path.display().to_string(), source:?; "Loading configuration");

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    Ok(config)
}
