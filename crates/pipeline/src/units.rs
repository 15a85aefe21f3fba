//! Reporting units of the tract outcome

use nitrogis_core::TractPolygon;
use serde::{Deserialize, Serialize};

/// How the outcome values are expressed.
///
/// Inferred for display only; regressions always use the outcome as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeUnits {
    /// Fractions of the population (largest value <= 1)
    Proportion,
    /// Anything else, e.g. cases per 100,000
    Raw,
}

impl OutcomeUnits {
    /// `Proportion` when every finite outcome is at most 1, `Raw` otherwise
    /// or when no tract has an outcome.
    pub fn infer(tracts: &[TractPolygon]) -> Self {
        let max = tracts
            .iter()
            .filter_map(|t| t.outcome)
            .filter(|v| v.is_finite())
            .reduce(f64::max);

        match max {
            Some(m) if m <= 1.0 => OutcomeUnits::Proportion,
            _ => OutcomeUnits::Raw,
        }
    }

    /// Factor that turns an outcome into a display rate
    pub fn display_scale(&self) -> f64 {
        match self {
            OutcomeUnits::Proportion => 100_000.0,
            OutcomeUnits::Raw => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeUnits::Proportion => "proportion",
            OutcomeUnits::Raw => "raw",
        }
    }
}
