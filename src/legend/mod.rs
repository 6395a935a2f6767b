//! Legend configuration: placement, display mode and the options record
//! persisted with each panel, plus the calc id registry.

pub mod calcs;
pub mod types;

pub use types::{LegendDisplayMode, LegendPlacement, VizLegendOptions};
