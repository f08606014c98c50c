use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Main questionnaire configuration.
///
/// Defines the Gompertz parameters, the aggregation domains with their
/// ln-hazard caps, and every scoreable item with its hazard-ratio table
/// and classification rule.
///
/// Example YAML:
/// ```yaml
/// algo_version: "THA-2024.2"
/// mrdt_years: 8.0
/// age_clamp_years: 10.0
/// domains:
///   body: { ln_cap_lo: -0.20, ln_cap_hi: 0.40 }
/// items:
///   - id: sleep_hours
///     domain: body
///     group: body_energy
///     order: 50
///     hr: [1.45, 1.22, 1.10, 1.04, 1.00]
///     options_range:
///       - { max: 4.9, bin: 0 }
///       - { max: 5.9, bin: 1 }
///       - { max: 6.9, bin: 2 }
///       - { min: 9.1, bin: 3 }
///       - { bin: 4 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Version tag echoed into every result (default: "THA-unknown")
    #[serde(default = "default_algo_version")]
    pub algo_version: String,

    /// Mortality rate doubling time in years; the Gompertz slope is
    /// ln(2) / mrdt_years
    pub mrdt_years: f64,

    /// Symmetric bound on the final age acceleration, in years
    /// (default: 10.0)
    #[serde(default = "default_age_clamp_years")]
    pub age_clamp_years: f64,

    /// Aggregation buckets; each domain's summed ln-hazard is clamped to
    /// its caps before entering the grand total
    pub domains: IndexMap<String, DomainCaps>,

    /// Questionnaire items; scoring output follows their `order` rank
    pub items: Vec<Item>,
}

/// Per-domain bounds on the summed ln-hazard, applied once after all of
/// the domain's items are added up.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DomainCaps {
    pub ln_cap_lo: f64,
    pub ln_cap_hi: f64,
}

/// One questionnaire item.
///
/// `hr` maps bin indices to hazard ratios, conventionally with the worst
/// risk at index 0. At most one classification rule may be present:
/// `options`, `options_range`, or an `input_type` of `multi_select` /
/// `free_text`. Items with none of these accept only direct bin indices.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Item {
    pub id: String,

    /// Owning domain; must be declared under `domains`
    pub domain: String,

    /// Hazard ratio per bin; at least two entries
    pub hr: Vec<f64>,

    /// Optional display labels, one per bin
    #[serde(default)]
    pub bins: Option<Vec<String>>,

    /// Hazard ratio applied when the item is unanswered (default: 1.0)
    #[serde(default)]
    pub missing_hr: Option<f64>,

    /// Presentation rank; unordered items sort last
    #[serde(default)]
    pub order: Option<u32>,

    /// Presentation grouping tag (default group: "ungrouped")
    #[serde(default)]
    pub group: Option<String>,

    /// Marks multi-select and free-text items; scalar items leave it unset
    #[serde(default)]
    pub input_type: Option<InputType>,

    /// Explicit option-code to bin table
    #[serde(default)]
    pub options: Option<IndexMap<String, usize>>,

    /// Ordered numeric intervals; the first match wins
    #[serde(default)]
    pub options_range: Option<Vec<RangeBand>>,

    /// Per-label weights for multi-select scoring; unlisted labels weigh 0
    #[serde(default)]
    pub scoring_weights: Option<IndexMap<String, f64>>,

    /// How a multi-select score becomes a bin (default: count)
    #[serde(default)]
    pub score_mapping: Option<ScoreMapping>,
}

/// Input kinds that change how raw answers are interpreted.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Answer is a list of selected labels, scored then binned
    MultiSelect,
    /// Answer is collected but never scored
    FreeText,
}

/// One interval of a numeric-range rule.
///
/// Bounds are inclusive; a missing bound leaves that side unbounded. An
/// interval with a `category` only applies to answers carrying the same
/// category, which is how sex-specific thresholds are expressed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RangeBand {
    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub category: Option<String>,

    /// Bin selected when the interval matches
    pub bin: usize,
}

impl RangeBand {
    /// Whether `value` (with its optional category) falls in this interval.
    pub fn contains(&self, value: f64, category: Option<&str>) -> bool {
        if let Some(required) = &self.category {
            if category != Some(required.as_str()) {
                return false;
            }
        }
        let lo = self.min.unwrap_or(f64::NEG_INFINITY);
        let hi = self.max.unwrap_or(f64::INFINITY);
        lo <= value && value <= hi
    }
}

/// Mapping from a multi-select score to a bin index.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMapping {
    /// bin = min(floor(score), highest bin)
    #[default]
    Count,
    /// Graded cutoffs at 0.1 / 0.3 / 0.6, mapping low scores to the most
    /// favorable bins; used by the medical-history items
    Thresholds,
}

fn default_algo_version() -> String {
    "THA-unknown".to_string()
}

fn default_age_clamp_years() -> f64 {
    10.0
}
