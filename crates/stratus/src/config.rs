//! Configuration types for Stratus layout runs.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file. Every field is optional and falls back to the same defaults as
//! [`PresetOptions::default`].
//!
//! # Example
//!
//! ```
//! # use stratus::{config::AppConfig, Preset};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().preset(), Preset::FlowLr);
//! ```

use serde::Deserialize;

use stratus_core::model::PathStyle;

use crate::{
    layout::EngineChoice,
    preset::{Preset, PresetOptions, Spacing},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}

/// Defaults for the `[layout]` section.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Engine used by the flow and swimlane presets.
    #[serde(default)]
    engine: EngineChoice,

    #[serde(default)]
    preset: Preset,

    #[serde(default)]
    spacing: Spacing,

    /// Path style written onto every edge.
    #[serde(default)]
    edge_style: PathStyle,

    #[serde(default)]
    emphasize_primary_path: bool,
}

impl LayoutConfig {
    pub fn engine(&self) -> EngineChoice {
        self.engine
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn edge_style(&self) -> PathStyle {
        self.edge_style
    }

    pub fn emphasize_primary_path(&self) -> bool {
        self.emphasize_primary_path
    }

    /// Preset options carrying these defaults, with no selected service.
    pub fn preset_options(&self) -> PresetOptions {
        PresetOptions::new()
            .with_engine(self.engine)
            .with_preset(self.preset)
            .with_spacing(self.spacing)
            .with_edge_style(self.edge_style)
            .with_emphasize_primary_path(self.emphasize_primary_path)
    }
}
