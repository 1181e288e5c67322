//! Stratus - automatic layout for cloud architecture diagrams.
//!
//! Takes services, the connections between them, and the logical groups that
//! contain them, and produces coordinates and container sizes ready for
//! rendering. Two layout engines share one interface, and a small set of
//! presets arranges whole diagrams as directional flows, swimlanes, or rings.
//!
//! # Example
//!
//! ```
//! # use futures::executor::block_on;
//! use stratus::{
//!     Arranger, PresetOptions,
//!     model::{Connection, Diagram, Group, Service},
//! };
//!
//! let diagram = Diagram::from_architecture(
//!     vec![
//!         Service::new("web", "Web App").with_group("frontend"),
//!         Service::new("db", "SQL Database"),
//!     ],
//!     vec![Connection::new("web", "db")],
//!     vec![Group::new("frontend", "Frontend")],
//! );
//!
//! let mut arranger = Arranger::new();
//! let arranged = block_on(arranger.apply_preset(&diagram, &PresetOptions::default()));
//! assert_eq!(arranged.groups().len(), 1);
//! ```

pub mod config;
pub mod layout;
pub mod preset;

mod error;
mod structure;

pub use stratus_core::{geometry, model};

pub use error::StratusError;
pub use layout::{EngineBuilder, EngineChoice, FlowDirection, LayoutEngine, LayoutOptions, LayoutResult};
pub use preset::{Arranger, Preset, PresetOptions, Spacing, suggest_direction};
