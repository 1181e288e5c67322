//! Layout presets applied to a whole diagram.
//!
//! A preset picks one arrangement strategy and the spacing it runs with:
//!
//! - [`Preset::FlowLr`] / [`Preset::FlowTb`] - a directional flow from a layout
//!   engine, optionally with the primary path straightened
//! - [`Preset::Swimlanes`] - one lane per group, stacked vertically
//! - [`Preset::Radial`] - rings of services around the most connected one
//!
//! Every preset tags all edges with the requested [`PathStyle`].
//!
//! # Example
//!
//! ```
//! # use futures::executor::block_on;
//! # use stratus::model::{Connection, Diagram, Service};
//! # use stratus::preset::{Arranger, Preset, PresetOptions};
//! let diagram = Diagram::from_architecture(
//!     vec![Service::new("web", "Web"), Service::new("db", "Database")],
//!     vec![Connection::new("web", "db")],
//!     vec![],
//! );
//!
//! let mut arranger = Arranger::new();
//! let options = PresetOptions::new().with_preset(Preset::FlowTb);
//! let arranged = block_on(arranger.apply_preset(&diagram, &options));
//!
//! let web = arranged.service("web").unwrap().position();
//! let db = arranged.service("db").unwrap().position();
//! assert!(db.y() > web.y());
//! ```

mod adjacency;
mod primary_path;
mod radial;
mod spacing;
mod swimlanes;

pub use spacing::{Spacing, SpacingMetrics};

use std::{fmt, str::FromStr};

use log::{info, trace};
use serde::{Deserialize, Serialize};

use stratus_core::model::{Diagram, Edge, PathStyle, Service};

use crate::layout::{EngineBuilder, EngineChoice, FlowDirection, positioning};

/// The arrangement strategy of a preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    #[default]
    FlowLr,
    FlowTb,
    Swimlanes,
    Radial,
}

impl Preset {
    /// The flow direction for directional presets.
    fn flow_direction(self) -> Option<FlowDirection> {
        match self {
            Self::FlowLr => Some(FlowDirection::LeftToRight),
            Self::FlowTb => Some(FlowDirection::TopToBottom),
            Self::Swimlanes | Self::Radial => None,
        }
    }
}

impl FromStr for Preset {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flow-lr" => Ok(Self::FlowLr),
            "flow-tb" => Ok(Self::FlowTb),
            "swimlanes" => Ok(Self::Swimlanes),
            "radial" => Ok(Self::Radial),
            _ => Err("Unsupported layout preset"),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FlowLr => "flow-lr",
            Self::FlowTb => "flow-tb",
            Self::Swimlanes => "swimlanes",
            Self::Radial => "radial",
        };
        write!(f, "{name}")
    }
}

/// Everything a single preset run needs to know.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetOptions {
    preset: Preset,
    spacing: Spacing,
    edge_style: PathStyle,
    emphasize_primary_path: bool,
    selected_node_id: Option<String>,
    engine: EngineChoice,
}

impl PresetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_edge_style(mut self, edge_style: PathStyle) -> Self {
        self.edge_style = edge_style;
        self
    }

    /// Straighten the dominant chain of the flow presets.
    pub fn with_emphasize_primary_path(mut self, emphasize: bool) -> Self {
        self.emphasize_primary_path = emphasize;
        self
    }

    /// Service the radial preset should center on.
    pub fn with_selected_node_id(mut self, id: Option<String>) -> Self {
        self.selected_node_id = id;
        self
    }

    pub fn with_engine(mut self, engine: EngineChoice) -> Self {
        self.engine = engine;
        self
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

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    pub fn engine(&self) -> EngineChoice {
        self.engine
    }
}

/// Applies presets to diagrams, reusing layout engines between runs.
///
/// [`Arranger::apply_preset`] takes `&mut self`, so one arranger serves one
/// preset run at a time.
#[derive(Default)]
pub struct Arranger {
    engines: EngineBuilder,
}

impl Arranger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rearranges `diagram` according to `options`.
    ///
    /// Never fails: degenerate input falls back to a plausible arrangement, and
    /// a preset with nothing to arrange returns the diagram with only its edges
    /// restyled.
    pub async fn apply_preset(&mut self, diagram: &Diagram, options: &PresetOptions) -> Diagram {
        info!(
            preset:% = options.preset(),
            engine:% = options.engine(),
            services = diagram.services().len(),
            groups = diagram.groups().len();
            "Applying layout preset"
        );
        let metrics = options.spacing().metrics();
        let edges: Vec<Edge> = diagram
            .edges()
            .iter()
            .cloned()
            .map(|edge| edge.with_path_style(options.edge_style()))
            .collect();

        let arranged = match options.preset() {
            Preset::FlowLr | Preset::FlowTb => {
                let direction = options
                    .preset()
                    .flow_direction()
                    .unwrap_or_default();
                let (services, connections, groups) = diagram.architecture();
                let engine = self.engines.engine(options.engine());
                let result = engine
                    .layout(&services, &connections, &groups, &metrics.layout_options(direction))
                    .await;
                let (services, groups) = result.into_parts();

                if options.emphasize_primary_path() {
                    let (services, edges) =
                        primary_path::emphasize(services, &groups, edges, direction);
                    Diagram::new(services, groups, edges)
                } else {
                    Diagram::new(services, groups, edges)
                }
            }
            Preset::Swimlanes => {
                let connections: Vec<_> =
                    edges.iter().map(|edge| edge.connection().clone()).collect();
                let engine = self.engines.engine(options.engine());
                let (services, groups) = swimlanes::arrange(
                    diagram.services(),
                    diagram.groups(),
                    &connections,
                    &metrics,
                    engine,
                )
                .await;
                Diagram::new(services, groups, edges)
            }
            Preset::Radial => {
                let connections: Vec<_> =
                    edges.iter().map(|edge| edge.connection().clone()).collect();
                let services = radial::arrange(
                    diagram.services(),
                    &connections,
                    &metrics,
                    options.selected_node_id(),
                );
                Diagram::new(services, positioning::sanitize_groups(diagram.groups()), edges)
            }
        };

        trace!(diagram:? = arranged; "Arranged diagram");
        info!(preset:% = options.preset(); "Layout preset applied");
        arranged
    }
}

/// Flow direction recommended for a set of services.
///
/// Every architecture currently reads best left to right.
pub fn suggest_direction(_services: &[Service]) -> FlowDirection {
    FlowDirection::LeftToRight
}
