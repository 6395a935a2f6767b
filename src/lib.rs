//! vizlegend
//!
//! Typed legend options for chart panels, and a small store of reusable
//! *library panels* whose models carry those options. Pairs with the
//! `vizlegend` CLI.
//!
//! ### Features
//! - `LegendPlacement`, `LegendDisplayMode` and `VizLegendOptions` with stable
//!   string tokens for persisted configuration
//! - Opt-in validation of `calcs` against the recognized calculation ids
//! - Library panels: create, patch, connect/disconnect dashboards, delete
//! - Save the store as JSON, export a listing as CSV
//!
//! ### Example
//! ```
//! use vizlegend::{LegendDisplayMode, LegendPlacement, VizLegendOptions};
//!
//! let opts = VizLegendOptions::from_json_str(
//!     r#"{"calcs":["mean","max"],"displayMode":"table","placement":"right"}"#,
//! )?;
//! assert_eq!(opts.display_mode, LegendDisplayMode::Table);
//! assert_eq!(opts.placement, LegendPlacement::Right);
//! opts.validate()?;
//! # Ok::<(), vizlegend::error::LegendError>(())
//! ```

pub mod error;
pub mod legend;
pub mod library;
pub mod models;
pub mod storage;

pub use error::{LegendError, LibraryError};
pub use legend::{LegendDisplayMode, LegendPlacement, VizLegendOptions};
pub use library::LibraryPanelService;
pub use models::{LibraryPanel, Role, SignedInUser};
