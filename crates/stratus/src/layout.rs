//! Layout engines that turn an architecture into positioned services and groups.
//!
//! # Pipeline Position
//!
//! ```text
//! Services / Connections / Groups
//!     ↓ structure
//! ArchitectureGraph
//!     ↓ layout (this module)
//! LayoutResult
//!     ↓ preset
//! Diagram
//! ```
//!
//! # Submodules
//!
//! - [`overlap`] - Pairwise overlap resolution for group rectangles
//!
//! # Re-exports
//!
//! - [`EngineBuilder`] - Cache of configured layout engines

mod engines;
pub mod overlap;
pub(crate) mod positioning;

pub use engines::EngineBuilder;

use std::{fmt, str::FromStr};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use stratus_core::{
    geometry::{Point, Size},
    model::{Connection, Group, PositionedGroup, PositionedService, Service},
};

/// Direction in which connections flow across the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    #[default]
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "RL")]
    RightToLeft,
    #[serde(rename = "BT")]
    BottomToTop,
}

impl FlowDirection {
    /// Whether ranks advance along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Whether ranks advance toward decreasing coordinates.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::RightToLeft | Self::BottomToTop)
    }

    /// Extent of `size` along the flow axis.
    pub(crate) fn flow_extent(self, size: Size) -> f32 {
        if self.is_horizontal() {
            size.width()
        } else {
            size.height()
        }
    }

    /// Extent of `size` across the flow axis.
    pub(crate) fn cross_extent(self, size: Size) -> f32 {
        if self.is_horizontal() {
            size.height()
        } else {
            size.width()
        }
    }

    /// Maps a `(flow, cross)` pair onto canvas coordinates.
    pub(crate) fn to_point(self, flow: f32, cross: f32) -> Point {
        if self.is_horizontal() {
            Point::new(flow, cross)
        } else {
            Point::new(cross, flow)
        }
    }

    /// Builds a canvas size from flow and cross extents.
    pub(crate) fn to_size(self, flow: f32, cross: f32) -> Size {
        if self.is_horizontal() {
            Size::new(flow, cross)
        } else {
            Size::new(cross, flow)
        }
    }
}

/// Numeric options shared by every layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    direction: FlowDirection,
    node_spacing: f32,
    rank_spacing: f32,
    group_padding: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: FlowDirection::default(),
            node_spacing: 150.0,
            rank_spacing: 200.0,
            group_padding: 80.0,
        }
    }
}

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: FlowDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Minimum gap between sibling nodes of one rank.
    pub fn with_node_spacing(mut self, spacing: f32) -> Self {
        self.node_spacing = spacing;
        self
    }

    /// Minimum gap between successive ranks.
    pub fn with_rank_spacing(mut self, spacing: f32) -> Self {
        self.rank_spacing = spacing;
        self
    }

    /// Margin inside each group container.
    pub fn with_group_padding(mut self, padding: f32) -> Self {
        self.group_padding = padding;
        self
    }

    pub fn direction(&self) -> FlowDirection {
        self.direction
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }

    pub fn group_padding(&self) -> f32 {
        self.group_padding
    }
}

/// Positioned services and groups produced by one layout call.
///
/// Grouped services carry positions relative to their group's top-left corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    services: Vec<PositionedService>,
    groups: Vec<PositionedGroup>,
}

impl LayoutResult {
    pub fn new(services: Vec<PositionedService>, groups: Vec<PositionedGroup>) -> Self {
        Self { services, groups }
    }

    pub fn services(&self) -> &[PositionedService] {
        &self.services
    }

    pub fn groups(&self) -> &[PositionedGroup] {
        &self.groups
    }

    pub fn service(&self, id: &str) -> Option<&PositionedService> {
        self.services.iter().find(|service| service.id() == id)
    }

    pub fn group(&self, id: &str) -> Option<&PositionedGroup> {
        self.groups.iter().find(|group| group.id() == id)
    }

    /// Absolute canvas position of a service of this result.
    pub fn absolute_position(&self, service: &PositionedService) -> Point {
        match service.group_id().and_then(|id| self.group(id)) {
            Some(group) => group.position().add_point(service.position()),
            None => service.position(),
        }
    }

    /// True when every coordinate is finite and every group has a positive size.
    pub fn is_finite(&self) -> bool {
        self.services
            .iter()
            .all(|service| service.position().is_finite())
            && self
                .groups
                .iter()
                .all(|group| group.position().is_finite() && group.size().is_positive())
    }

    pub fn into_parts(self) -> (Vec<PositionedService>, Vec<PositionedGroup>) {
        (self.services, self.groups)
    }
}

/// Which engine implementation computes a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineChoice {
    /// The layered engine with compound collapse/expand.
    #[default]
    Primary,
    /// The nested engine built on `rust-sugiyama`.
    Alternative,
}

impl FromStr for EngineChoice {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "alternative" => Ok(Self::Alternative),
            _ => Err("Unsupported layout engine"),
        }
    }
}

impl fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "primary",
            Self::Alternative => "alternative",
        };
        write!(f, "{name}")
    }
}

/// Interface shared by all layout engines.
///
/// Results are always deferred so that callers never branch on which engine
/// they hold; an engine may still finish its work before the future is returned.
pub trait LayoutEngine: Send + Sync {
    /// Lay out services, connections, and groups.
    ///
    /// Never fails for plausible input: dangling references, id collisions, and
    /// degenerate geometry are logged and replaced with fallbacks.
    fn layout<'a>(
        &'a self,
        services: &'a [Service],
        connections: &'a [Connection],
        groups: &'a [Group],
        options: &'a LayoutOptions,
    ) -> BoxFuture<'a, LayoutResult>;
}
