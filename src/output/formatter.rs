use indexmap::IndexMap;
use serde::Serialize;

use crate::engine::ThaResult;

/// Display summary of an evaluation, rounded to two decimals.
///
/// This is the shape the CLI prints; programmatic callers wanting full
/// precision use [`ThaResult`] directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub algo_version: String,

    /// Gompertz slope, passed through unrounded
    pub b: f64,

    #[serde(rename = "THA")]
    pub tha: f64,

    #[serde(rename = "AgeAccel")]
    pub age_accel: f64,

    #[serde(rename = "domainYears")]
    pub domain_years: IndexMap<String, f64>,
}

/// Build the display summary from a full result.
pub fn summarize(result: &ThaResult) -> Summary {
    Summary {
        algo_version: result.algo_version.clone(),
        b: result.b,
        tha: round2(result.tha),
        age_accel: round2(result.age_accel),
        domain_years: result
            .domain_years
            .iter()
            .map(|(name, years)| (name.clone(), round2(*years)))
            .collect(),
    }
}

/// Render a summary as indented JSON.
pub fn to_pretty_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
