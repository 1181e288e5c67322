//! Spacing presets and the numeric table behind them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::{FlowDirection, LayoutOptions};

/// Density of an arranged diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Compact,
    #[default]
    Comfortable,
}

impl FromStr for Spacing {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(Self::Compact),
            "comfortable" => Ok(Self::Comfortable),
            _ => Err("Unsupported spacing"),
        }
    }
}

impl Spacing {
    /// The fixed constants for this density.
    pub fn metrics(self) -> SpacingMetrics {
        match self {
            Self::Compact => SpacingMetrics {
                node_spacing: 110.0,
                rank_spacing: 140.0,
                group_padding: 60.0,
                lane_gap: 80.0,
                radial_base_radius: 170.0,
                radial_ring_step: 160.0,
            },
            Self::Comfortable => SpacingMetrics {
                node_spacing: 150.0,
                rank_spacing: 200.0,
                group_padding: 80.0,
                lane_gap: 120.0,
                radial_base_radius: 220.0,
                radial_ring_step: 200.0,
            },
        }
    }
}

/// Numeric constants consumed by the presets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingMetrics {
    node_spacing: f32,
    rank_spacing: f32,
    group_padding: f32,
    lane_gap: f32,
    radial_base_radius: f32,
    radial_ring_step: f32,
}

impl SpacingMetrics {
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }

    pub fn group_padding(&self) -> f32 {
        self.group_padding
    }

    /// Vertical gap between two swimlanes.
    pub fn lane_gap(&self) -> f32 {
        self.lane_gap
    }

    /// Radius of the first ring around the radial center.
    pub fn radial_base_radius(&self) -> f32 {
        self.radial_base_radius
    }

    /// Radius added for every further ring.
    pub fn radial_ring_step(&self) -> f32 {
        self.radial_ring_step
    }

    /// Engine options for a layout in `direction` at this density.
    pub fn layout_options(&self, direction: FlowDirection) -> LayoutOptions {
        LayoutOptions::new()
            .with_direction(direction)
            .with_node_spacing(self.node_spacing)
            .with_rank_spacing(self.rank_spacing)
            .with_group_padding(self.group_padding)
    }
}
