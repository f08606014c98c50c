use std::collections::HashMap;

use serde::Deserialize;

/// One raw questionnaire answer.
///
/// Answers files are JSON objects keyed by item id. Values deserialize
/// untagged, so the variant order here doubles as the decoding priority:
/// a string becomes a [`Code`](Answer::Code), a number a
/// [`Number`](Answer::Number), a `[number, string]` pair a
/// [`NumberWithCategory`](Answer::NumberWithCategory), and a string array
/// a [`Selections`](Answer::Selections). [`Bin`](Answer::Bin) is never
/// produced from JSON (integers decode as numbers); it exists for callers
/// that already hold a resolved bin index, such as the middle-bin default
/// answers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Option code looked up in the item's option table.
    Code(String),
    /// Measurement or score. Integral values double as direct bin
    /// indices for items that have no range rule.
    Number(f64),
    /// Measurement plus the category that selects which ranges apply,
    /// e.g. sex-specific waist thresholds.
    NumberWithCategory(f64, String),
    /// Selected labels of a multi-select item.
    Selections(Vec<String>),
    /// An already-resolved bin index.
    Bin(usize),
}

/// Raw answers keyed by item id. An absent id means the item was not
/// answered.
pub type AnswerMap = HashMap<String, Answer>;

impl Answer {
    /// Numeric view used by the derived-metric feeders.
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(value) => Some(*value),
            Answer::Bin(index) => Some(*index as f64),
            _ => None,
        }
    }

    /// Compact rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Answer::Code(code) => format!("'{code}'"),
            Answer::Number(value) => value.to_string(),
            Answer::NumberWithCategory(value, category) => {
                format!("({value}, '{category}')")
            }
            Answer::Selections(labels) => format!("{labels:?}"),
            Answer::Bin(index) => format!("bin {index}"),
        }
    }
}
