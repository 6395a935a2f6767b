//! Public types and constants for legend configuration.
//!
//! The string tokens used here (`"bottom"`, `"right"`, `"hidden"`, `"list"`, `"table"`)
//! are part of the persisted panel configuration. Do not rename them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LegendError;

/// Legend placement relative to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPlacement {
    /// Horizontal legend band below the chart.
    #[default]
    Bottom,
    /// Legend column to the right of the chart.
    Right,
}

impl LegendPlacement {
    pub const ALL: [LegendPlacement; 2] = [LegendPlacement::Bottom, LegendPlacement::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegendPlacement::Bottom => "bottom",
            LegendPlacement::Right => "right",
        }
    }
}

impl fmt::Display for LegendPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegendPlacement {
    type Err = LegendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| LegendError::UnknownPlacement(s.to_string()))
    }
}

/// How the legend is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendDisplayMode {
    /// No legend at all.
    Hidden,
    /// One entry per series, calcs inline after the label.
    #[default]
    List,
    /// One row per series with a column per calc.
    Table,
}

impl LegendDisplayMode {
    pub const ALL: [LegendDisplayMode; 3] = [
        LegendDisplayMode::Hidden,
        LegendDisplayMode::List,
        LegendDisplayMode::Table,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegendDisplayMode::Hidden => "hidden",
            LegendDisplayMode::List => "list",
            LegendDisplayMode::Table => "table",
        }
    }
}

impl fmt::Display for LegendDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegendDisplayMode {
    type Err = LegendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| LegendError::UnknownDisplayMode(s.to_string()))
    }
}

/// Legend options as stored under `options.legend` of a panel model.
///
/// All three fields are required when deserializing. `calcs` is kept in the given
/// order because it is the display order of the computed statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VizLegendOptions {
    pub calcs: Vec<String>,
    pub display_mode: LegendDisplayMode,
    pub placement: LegendPlacement,
}

impl VizLegendOptions {
    pub fn new<I, S>(calcs: I, display_mode: LegendDisplayMode, placement: LegendPlacement) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            calcs: calcs.into_iter().map(Into::into).collect(),
            display_mode,
            placement,
        }
    }

    /// `false` only for [`LegendDisplayMode::Hidden`].
    pub fn is_visible(&self) -> bool {
        self.display_mode != LegendDisplayMode::Hidden
    }

    pub fn from_json_str(s: &str) -> Result<Self, LegendError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, LegendError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check `calcs` against the recognized calculation ids.
    pub fn validate(&self) -> Result<(), LegendError> {
        super::calcs::validate_calcs(&self.calcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_parse_back() {
        for p in LegendPlacement::ALL {
            assert_eq!(p.as_str().parse::<LegendPlacement>().unwrap(), p);
        }
        for m in LegendDisplayMode::ALL {
            assert_eq!(m.to_string().parse::<LegendDisplayMode>().unwrap(), m);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("Bottom".parse::<LegendPlacement>().is_err());
        assert!("TABLE".parse::<LegendDisplayMode>().is_err());
    }

    #[test]
    fn default_is_visible_list_at_bottom() {
        let o = VizLegendOptions::default();
        assert!(o.calcs.is_empty());
        assert_eq!(o.display_mode, LegendDisplayMode::List);
        assert_eq!(o.placement, LegendPlacement::Bottom);
        assert!(o.is_visible());
    }
}
