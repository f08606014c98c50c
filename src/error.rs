use thiserror::Error;

/// Errors produced while validating a questionnaire configuration or
/// evaluating answers against it.
///
/// Evaluation is all-or-nothing. The first classification failure aborts
/// the run; there are no partial results.
#[derive(Debug, Error)]
pub enum ThaError {
    /// The configuration is malformed or internally inconsistent. Carries
    /// every violation found, each naming the offending domain or item.
    #[error("invalid configuration: {}", .0.join("; "))]
    Configuration(Vec<String>),

    /// A string answer that is not a key of the item's option table.
    #[error("unknown option '{value}' for item '{item}'")]
    UnknownOption { item: String, value: String },

    /// A numeric answer that falls inside none of the item's ranges.
    #[error("value {value} not in any range for item '{item}'")]
    RangeNotFound { item: String, value: f64 },

    /// An answer shape the item's classification rule cannot interpret.
    #[error("cannot interpret answer for item '{item}': {raw}")]
    BinClassification { item: String, raw: String },

    /// A selected hazard ratio that is not strictly positive.
    #[error("hazard ratio must be > 0 for item '{item}'")]
    InvalidHazardRatio { item: String },
}

pub type Result<T> = std::result::Result<T, ThaError>;
