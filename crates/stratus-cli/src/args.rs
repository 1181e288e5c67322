//! Command-line argument definitions for the Stratus CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Layout flags override the values loaded from the
//! configuration file; when a flag is absent the configured value is used.

use clap::Parser;

/// Command-line arguments for the Stratus layout tool
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input architecture file (TOML)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the arranged diagram (TOML)
    #[arg(short, long, default_value = "out.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout preset (flow-lr, flow-tb, swimlanes, radial)
    #[arg(long)]
    pub preset: Option<String>,

    /// Layout engine (primary, alternative)
    #[arg(long)]
    pub engine: Option<String>,

    /// Spacing preset (compact, comfortable)
    #[arg(long)]
    pub spacing: Option<String>,

    /// Edge path style (straight, smooth, orthogonal)
    #[arg(long)]
    pub edge_style: Option<String>,

    /// Straighten the primary path of flow layouts
    #[arg(long)]
    pub emphasize_primary_path: bool,

    /// Service to center the radial preset on
    #[arg(long)]
    pub selected: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
