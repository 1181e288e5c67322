//! Error types for Stratus operations.
//!
//! Layout itself never fails for plausible input: recoverable faults are logged
//! and replaced with fallbacks. [`StratusError`] surfaces only at the edges of
//! the system (configuration, input files) and inside engines, where a failed
//! algorithm run is turned into a fallback placement by the caller.

use std::io;

use thiserror::Error;

/// The main error type for Stratus operations.
#[derive(Debug, Error)]
pub enum StratusError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Layout error: {0}")]
    Layout(String),
}
