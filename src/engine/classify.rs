use indexmap::IndexMap;

use crate::answer::Answer;
use crate::config::{InputType, Item, RangeBand, ScoreMapping};
use crate::error::{Result, ThaError};

/// Labels that stand for "nothing applies" in a multi-select answer.
pub(crate) const SENTINEL_LABELS: [&str; 3] = ["None", "Not sure", "No"];

/// Graded cutoffs for `score_mapping: thresholds`.
const THRESHOLD_CLEAR: f64 = 0.1;
const THRESHOLD_MINOR: f64 = 0.3;
const THRESHOLD_MODERATE: f64 = 0.6;

/// One item's classification strategy, resolved once at engine build.
#[derive(Debug, Clone)]
pub(crate) enum ClassifyRule {
    /// Explicit option-code to bin table
    Options(IndexMap<String, usize>),
    /// Ordered inclusive intervals, first match wins
    Ranges(Vec<RangeBand>),
    /// Selections scored by weight sum or count, then mapped to a bin
    MultiSelect {
        weights: Option<IndexMap<String, f64>>,
        mapping: ScoreMapping,
    },
    /// Collected but never scored
    FreeText,
    /// Only direct bin indices are meaningful
    DirectOnly,
}

impl ClassifyRule {
    /// Pick the rule variant an item uses. Unsupported field combinations
    /// are rejected by validation before this runs.
    pub(crate) fn resolve(item: &Item) -> ClassifyRule {
        match item.input_type {
            Some(InputType::MultiSelect) => ClassifyRule::MultiSelect {
                weights: item.scoring_weights.clone(),
                mapping: item.score_mapping.unwrap_or_default(),
            },
            Some(InputType::FreeText) => ClassifyRule::FreeText,
            None => {
                if let Some(ref options) = item.options {
                    ClassifyRule::Options(options.clone())
                } else if let Some(ref bands) = item.options_range {
                    ClassifyRule::Ranges(bands.clone())
                } else {
                    ClassifyRule::DirectOnly
                }
            }
        }
    }
}

/// Map one raw answer to a bin index in `[0, bins)`.
///
/// Returns `Ok(None)` only for free-text items, which never classify.
/// A direct bin index bypasses the rule for every other variant, so a
/// value that is already a bin always round-trips unchanged.
pub(crate) fn classify(
    rule: &ClassifyRule,
    item_id: &str,
    bins: usize,
    answer: &Answer,
) -> Result<Option<usize>> {
    match (rule, answer) {
        (ClassifyRule::FreeText, _) => Ok(None),

        (_, Answer::Bin(index)) => {
            if *index < bins {
                Ok(Some(*index))
            } else {
                Err(cannot_interpret(item_id, answer))
            }
        }

        (ClassifyRule::Options(table), Answer::Code(code)) => match table.get(code) {
            Some(bin) => Ok(Some(*bin)),
            None => Err(ThaError::UnknownOption {
                item: item_id.to_string(),
                value: code.clone(),
            }),
        },
        (ClassifyRule::Options(_), Answer::Number(value)) => {
            integral_bin(*value, item_id, bins, answer)
        }

        (ClassifyRule::Ranges(bands), Answer::Number(value)) => {
            match_bands(bands, *value, None, item_id)
        }
        (ClassifyRule::Ranges(bands), Answer::NumberWithCategory(value, category)) => {
            match_bands(bands, *value, Some(category), item_id)
        }

        (ClassifyRule::MultiSelect { weights, mapping }, Answer::Selections(selected)) => {
            let score = multiselect_score(weights.as_ref(), selected);
            Ok(Some(score_to_bin(*mapping, score, bins - 1)))
        }
        (ClassifyRule::MultiSelect { .. }, Answer::Number(value)) => {
            integral_bin(*value, item_id, bins, answer)
        }

        (ClassifyRule::DirectOnly, Answer::Number(value)) => {
            integral_bin(*value, item_id, bins, answer)
        }

        _ => Err(cannot_interpret(item_id, answer)),
    }
}

/// Score a multi-select answer.
///
/// An empty selection, or a single sentinel label on its own, scores 0.
/// With a weight table the score is the sum of the selected labels'
/// weights (unlisted labels contribute nothing); without one it is the
/// count of non-sentinel selections.
pub(crate) fn multiselect_score(
    weights: Option<&IndexMap<String, f64>>,
    selected: &[String],
) -> f64 {
    if selected.is_empty() {
        return 0.0;
    }
    if selected.len() == 1 && is_sentinel(&selected[0]) {
        return 0.0;
    }
    match weights {
        Some(table) => selected
            .iter()
            .filter_map(|label| table.get(label))
            .sum(),
        None => selected.iter().filter(|label| !is_sentinel(label)).count() as f64,
    }
}

/// Map a multi-select score to a bin, where `max_bin` is the most
/// favorable index.
pub(crate) fn score_to_bin(mapping: ScoreMapping, score: f64, max_bin: usize) -> usize {
    match mapping {
        ScoreMapping::Thresholds => {
            if score < THRESHOLD_CLEAR {
                max_bin
            } else if score < THRESHOLD_MINOR {
                max_bin.saturating_sub(1)
            } else if score < THRESHOLD_MODERATE {
                max_bin.saturating_sub(2)
            } else {
                0
            }
        }
        ScoreMapping::Count => (score.max(0.0).floor() as usize).min(max_bin),
    }
}

fn is_sentinel(label: &str) -> bool {
    SENTINEL_LABELS.contains(&label)
}

fn integral_bin(value: f64, item_id: &str, bins: usize, answer: &Answer) -> Result<Option<usize>> {
    if value.fract() == 0.0 && value >= 0.0 && value < bins as f64 {
        Ok(Some(value as usize))
    } else {
        Err(cannot_interpret(item_id, answer))
    }
}

fn match_bands(
    bands: &[RangeBand],
    value: f64,
    category: Option<&str>,
    item_id: &str,
) -> Result<Option<usize>> {
    for band in bands {
        if band.contains(value, category) {
            return Ok(Some(band.bin));
        }
    }
    Err(ThaError::RangeNotFound {
        item: item_id.to_string(),
        value,
    })
}

fn cannot_interpret(item_id: &str, answer: &Answer) -> ThaError {
    ThaError::BinClassification {
        item: item_id.to_string(),
        raw: answer.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_rule(pairs: &[(&str, usize)]) -> ClassifyRule {
        let table = pairs
            .iter()
            .map(|(code, bin)| (code.to_string(), *bin))
            .collect();
        ClassifyRule::Options(table)
    }

    fn band(min: Option<f64>, max: Option<f64>, bin: usize) -> RangeBand {
        RangeBand {
            min,
            max,
            category: None,
            bin,
        }
    }

    fn selections(labels: &[&str]) -> Answer {
        Answer::Selections(labels.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_direct_bin_bypasses_every_rule() {
        let rules = [
            options_rule(&[("never", 0)]),
            ClassifyRule::Ranges(vec![band(None, None, 0)]),
            ClassifyRule::MultiSelect {
                weights: None,
                mapping: ScoreMapping::Count,
            },
            ClassifyRule::DirectOnly,
        ];
        for rule in &rules {
            for index in 0..4 {
                let got = classify(rule, "item", 4, &Answer::Bin(index)).unwrap();
                assert_eq!(got, Some(index));
            }
        }
    }

    #[test]
    fn test_direct_bin_out_of_range() {
        let result = classify(&ClassifyRule::DirectOnly, "item", 3, &Answer::Bin(3));
        assert!(matches!(
            result,
            Err(ThaError::BinClassification { .. })
        ));
    }

    #[test]
    fn test_free_text_never_classifies() {
        let answers = [
            Answer::Code("whatever".to_string()),
            Answer::Number(3.0),
            Answer::Bin(1),
            selections(&["a", "b"]),
        ];
        for answer in &answers {
            let got = classify(&ClassifyRule::FreeText, "notes", 2, answer).unwrap();
            assert_eq!(got, None);
        }
    }

    #[test]
    fn test_options_lookup() {
        let rule = options_rule(&[("vegetable_oil", 0), ("olive_oil", 4)]);
        let got = classify(&rule, "fat", 5, &Answer::Code("olive_oil".to_string())).unwrap();
        assert_eq!(got, Some(4));
    }

    #[test]
    fn test_options_unknown_code() {
        let rule = options_rule(&[("never", 0)]);
        let result = classify(&rule, "item", 2, &Answer::Code("sometimes".to_string()));
        assert!(matches!(
            result,
            Err(ThaError::UnknownOption { value, .. }) if value == "sometimes"
        ));
    }

    #[test]
    fn test_options_integral_number_is_direct_index() {
        let rule = options_rule(&[("never", 0)]);
        assert_eq!(classify(&rule, "item", 3, &Answer::Number(2.0)).unwrap(), Some(2));
    }

    #[test]
    fn test_options_fractional_number_rejected() {
        let rule = options_rule(&[("never", 0)]);
        let result = classify(&rule, "item", 3, &Answer::Number(1.5));
        assert!(matches!(result, Err(ThaError::BinClassification { .. })));
    }

    #[test]
    fn test_ranges_first_match_wins() {
        let bands = vec![
            band(None, Some(4.9), 0),
            band(None, Some(5.9), 1),
            band(None, Some(6.9), 2),
            band(Some(9.1), None, 3),
            band(None, None, 4),
        ];
        let rule = ClassifyRule::Ranges(bands);

        assert_eq!(classify(&rule, "sleep", 5, &Answer::Number(4.0)).unwrap(), Some(0));
        assert_eq!(classify(&rule, "sleep", 5, &Answer::Number(5.5)).unwrap(), Some(1));
        assert_eq!(classify(&rule, "sleep", 5, &Answer::Number(7.5)).unwrap(), Some(4));
        assert_eq!(classify(&rule, "sleep", 5, &Answer::Number(10.0)).unwrap(), Some(3));
        // Boundary values are inclusive
        assert_eq!(classify(&rule, "sleep", 5, &Answer::Number(4.9)).unwrap(), Some(0));
        assert_eq!(classify(&rule, "sleep", 5, &Answer::Number(9.1)).unwrap(), Some(3));
    }

    #[test]
    fn test_ranges_no_match_is_an_error() {
        let rule = ClassifyRule::Ranges(vec![band(Some(0.0), Some(10.0), 0)]);
        let result = classify(&rule, "item", 2, &Answer::Number(11.0));
        assert!(matches!(
            result,
            Err(ThaError::RangeNotFound { value, .. }) if value == 11.0
        ));
    }

    #[test]
    fn test_ranges_with_categories() {
        let bands = vec![
            RangeBand {
                min: Some(40.0),
                max: None,
                category: Some("male".to_string()),
                bin: 0,
            },
            RangeBand {
                min: Some(35.0),
                max: None,
                category: Some("female".to_string()),
                bin: 0,
            },
            band(None, None, 1),
        ];
        let rule = ClassifyRule::Ranges(bands);

        let female = Answer::NumberWithCategory(36.0, "female".to_string());
        assert_eq!(classify(&rule, "waist", 2, &female).unwrap(), Some(0));

        let male = Answer::NumberWithCategory(36.0, "male".to_string());
        assert_eq!(classify(&rule, "waist", 2, &male).unwrap(), Some(1));

        // A plain number skips every categorized band
        assert_eq!(classify(&rule, "waist", 2, &Answer::Number(50.0)).unwrap(), Some(1));
    }

    #[test]
    fn test_ranges_reject_code_answers() {
        let rule = ClassifyRule::Ranges(vec![band(None, None, 0)]);
        let result = classify(&rule, "item", 2, &Answer::Code("six".to_string()));
        assert!(matches!(result, Err(ThaError::BinClassification { .. })));
    }

    #[test]
    fn test_direct_only_rejects_codes_and_selections() {
        assert!(classify(
            &ClassifyRule::DirectOnly,
            "item",
            3,
            &Answer::Code("often".to_string())
        )
        .is_err());
        assert!(classify(&ClassifyRule::DirectOnly, "item", 3, &selections(&["a"])).is_err());
    }

    #[test]
    fn test_multiselect_empty_and_sentinel_score_zero() {
        assert_eq!(multiselect_score(None, &[]), 0.0);
        for sentinel in SENTINEL_LABELS {
            assert_eq!(multiselect_score(None, &[sentinel.to_string()]), 0.0);
        }
    }

    #[test]
    fn test_multiselect_count_excludes_sentinels() {
        let selected = vec![
            "Heart disease".to_string(),
            "None".to_string(),
            "Obesity".to_string(),
        ];
        assert_eq!(multiselect_score(None, &selected), 2.0);
    }

    #[test]
    fn test_multiselect_weight_sum_ignores_unlisted_labels() {
        let mut weights = IndexMap::new();
        weights.insert("Heart disease".to_string(), 0.40);
        weights.insert("Thyroid disease".to_string(), 0.15);

        let selected = vec![
            "Heart disease".to_string(),
            "Thyroid disease".to_string(),
            "Something else".to_string(),
        ];
        let score = multiselect_score(Some(&weights), &selected);
        assert!((score - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_multiselect_sentinel_mixed_with_real_selection_counts() {
        // "None" alongside a real condition does not zero the score
        let selected = vec!["Heart disease".to_string(), "None".to_string()];
        assert_eq!(multiselect_score(None, &selected), 1.0);
    }

    #[test]
    fn test_count_mapping_caps_at_max_bin() {
        assert_eq!(score_to_bin(ScoreMapping::Count, 0.0, 3), 0);
        assert_eq!(score_to_bin(ScoreMapping::Count, 1.0, 3), 1);
        assert_eq!(score_to_bin(ScoreMapping::Count, 2.7, 3), 2);
        assert_eq!(score_to_bin(ScoreMapping::Count, 9.0, 3), 3);
    }

    #[test]
    fn test_thresholds_mapping_grades_by_score() {
        let max_bin = 3;
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.0, max_bin), 3);
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.15, max_bin), 2);
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.45, max_bin), 1);
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.80, max_bin), 0);
    }

    #[test]
    fn test_thresholds_mapping_saturates_on_short_tables() {
        // Two bins: every non-clear grade lands on the worst end
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.05, 1), 1);
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.15, 1), 0);
        assert_eq!(score_to_bin(ScoreMapping::Thresholds, 0.45, 1), 0);
    }

    #[test]
    fn test_multiselect_classifies_end_to_end() {
        let mut weights = IndexMap::new();
        weights.insert("Heart disease".to_string(), 0.40);
        weights.insert("Thyroid disease".to_string(), 0.15);
        let rule = ClassifyRule::MultiSelect {
            weights: Some(weights),
            mapping: ScoreMapping::Thresholds,
        };

        // Nothing selected beyond the sentinel: most favorable bin
        assert_eq!(classify(&rule, "fh", 4, &selections(&["None"])).unwrap(), Some(3));
        // One minor condition: one step down
        assert_eq!(
            classify(&rule, "fh", 4, &selections(&["Thyroid disease"])).unwrap(),
            Some(2)
        );
        // One major condition: two steps down
        assert_eq!(
            classify(&rule, "fh", 4, &selections(&["Heart disease"])).unwrap(),
            Some(1)
        );
        // Both: worst bin
        assert_eq!(
            classify(&rule, "fh", 4, &selections(&["Heart disease", "Thyroid disease"])).unwrap(),
            Some(0)
        );
    }

    #[test]
    fn test_multiselect_count_mode_classifies() {
        let rule = ClassifyRule::MultiSelect {
            weights: None,
            mapping: ScoreMapping::Count,
        };
        assert_eq!(classify(&rule, "pc", 4, &selections(&[])).unwrap(), Some(0));
        assert_eq!(
            classify(&rule, "pc", 4, &selections(&["a", "b"])).unwrap(),
            Some(2)
        );
        assert_eq!(
            classify(&rule, "pc", 4, &selections(&["a", "b", "c", "d", "e"])).unwrap(),
            Some(3)
        );
    }
}
