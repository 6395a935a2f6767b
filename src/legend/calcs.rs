//! Registry of recognized calculation ids for the `calcs` legend field.
//!
//! Only identifiers are tracked here. Computing the values belongs to the
//! consumer that owns the series data.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::LegendError;

/// `p1` .. `p99`
static PERCENTILE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^p([1-9][0-9]?)$").expect("valid percentile pattern"));

/// Standard reducers that may appear in `calcs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardCalc {
    Sum,
    Max,
    Min,
    LogMin,
    Mean,
    Median,
    Variance,
    StdDev,
    Last,
    First,
    Count,
    Range,
    Diff,
    DiffPerc,
    Delta,
    Step,
    FirstNotNull,
    LastNotNull,
    ChangeCount,
    DistinctCount,
    AllIsZero,
    AllIsNull,
    AllValues,
    UniqueValues,
}

impl StandardCalc {
    pub const ALL: [StandardCalc; 24] = [
        StandardCalc::Sum,
        StandardCalc::Max,
        StandardCalc::Min,
        StandardCalc::LogMin,
        StandardCalc::Mean,
        StandardCalc::Median,
        StandardCalc::Variance,
        StandardCalc::StdDev,
        StandardCalc::Last,
        StandardCalc::First,
        StandardCalc::Count,
        StandardCalc::Range,
        StandardCalc::Diff,
        StandardCalc::DiffPerc,
        StandardCalc::Delta,
        StandardCalc::Step,
        StandardCalc::FirstNotNull,
        StandardCalc::LastNotNull,
        StandardCalc::ChangeCount,
        StandardCalc::DistinctCount,
        StandardCalc::AllIsZero,
        StandardCalc::AllIsNull,
        StandardCalc::AllValues,
        StandardCalc::UniqueValues,
    ];

    /// Id as it appears in persisted configuration.
    pub fn id(&self) -> &'static str {
        match self {
            StandardCalc::Sum => "sum",
            StandardCalc::Max => "max",
            StandardCalc::Min => "min",
            StandardCalc::LogMin => "logmin",
            StandardCalc::Mean => "mean",
            StandardCalc::Median => "median",
            StandardCalc::Variance => "variance",
            StandardCalc::StdDev => "stdDev",
            StandardCalc::Last => "last",
            StandardCalc::First => "first",
            StandardCalc::Count => "count",
            StandardCalc::Range => "range",
            StandardCalc::Diff => "diff",
            StandardCalc::DiffPerc => "diffperc",
            StandardCalc::Delta => "delta",
            StandardCalc::Step => "step",
            StandardCalc::FirstNotNull => "firstNotNull",
            StandardCalc::LastNotNull => "lastNotNull",
            StandardCalc::ChangeCount => "changeCount",
            StandardCalc::DistinctCount => "distinctCount",
            StandardCalc::AllIsZero => "allIsZero",
            StandardCalc::AllIsNull => "allIsNull",
            StandardCalc::AllValues => "allValues",
            StandardCalc::UniqueValues => "uniqueValues",
        }
    }

    /// Column header / label shown next to the value.
    pub fn name(&self) -> &'static str {
        match self {
            StandardCalc::Sum => "Total",
            StandardCalc::Max => "Max",
            StandardCalc::Min => "Min",
            StandardCalc::LogMin => "Min (above zero)",
            StandardCalc::Mean => "Mean",
            StandardCalc::Median => "Median",
            StandardCalc::Variance => "Variance",
            StandardCalc::StdDev => "StdDev",
            StandardCalc::Last => "Last",
            StandardCalc::First => "First",
            StandardCalc::Count => "Count",
            StandardCalc::Range => "Range",
            StandardCalc::Diff => "Difference",
            StandardCalc::DiffPerc => "Difference percent",
            StandardCalc::Delta => "Delta",
            StandardCalc::Step => "Step",
            StandardCalc::FirstNotNull => "First *",
            StandardCalc::LastNotNull => "Last *",
            StandardCalc::ChangeCount => "Change count",
            StandardCalc::DistinctCount => "Distinct count",
            StandardCalc::AllIsZero => "All zeros",
            StandardCalc::AllIsNull => "All nulls",
            StandardCalc::AllValues => "All values",
            StandardCalc::UniqueValues => "All unique values",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

/// Percentile rank encoded by ids like `p95`.
pub fn percentile_of(id: &str) -> Option<u8> {
    PERCENTILE_ID
        .captures(id)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn is_known_calc(id: &str) -> bool {
    StandardCalc::from_id(id).is_some() || percentile_of(id).is_some()
}

/// Human label for a calc id; unknown ids are returned unchanged.
pub fn display_name(id: &str) -> String {
    if let Some(c) = StandardCalc::from_id(id) {
        c.name().to_string()
    } else if let Some(p) = percentile_of(id) {
        format!("{p}th %")
    } else {
        id.to_string()
    }
}

/// Reject duplicates first, then report every unknown id in input order.
pub fn validate_calcs(calcs: &[String]) -> Result<(), LegendError> {
    let mut seen = BTreeSet::new();
    for c in calcs {
        if !seen.insert(c.as_str()) {
            return Err(LegendError::DuplicateCalc(c.clone()));
        }
    }
    let unknown: Vec<String> = calcs
        .iter()
        .filter(|c| !is_known_calc(c))
        .cloned()
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(LegendError::UnknownCalcs(unknown))
    }
}
