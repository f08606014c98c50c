use super::derived::{BODY_DOMAIN, HEIGHT_ITEM, WEIGHT_ITEM};
use crate::config::{Config, InputType, Item};
use std::collections::HashSet;

/// Validate a questionnaire configuration at load time.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Validate Gompertz parameters
    if !config.mrdt_years.is_finite() || config.mrdt_years <= 0.0 {
        errors.push("mrdt_years: must be a finite value > 0".to_string());
    }
    if !config.age_clamp_years.is_finite() || config.age_clamp_years < 0.0 {
        errors.push("age_clamp_years: must be a finite value >= 0".to_string());
    }

    // Validate domain caps
    for (name, caps) in &config.domains {
        if !caps.ln_cap_lo.is_finite() || !caps.ln_cap_hi.is_finite() {
            errors.push(format!("domains.{name}: caps must be finite"));
        } else if caps.ln_cap_lo > caps.ln_cap_hi {
            errors.push(format!("domains.{name}: ln_cap_lo exceeds ln_cap_hi"));
        }
    }

    // Validate items
    let mut seen_ids = HashSet::new();
    for item in &config.items {
        if !seen_ids.insert(item.id.as_str()) {
            errors.push(format!("items.{}: duplicate item id", item.id));
        }
        validate_item(config, item, &mut errors);
    }

    // Height/weight feed the BMI contribution, which lands in "body"
    let has_bmi_feeder = config
        .items
        .iter()
        .any(|item| item.id == HEIGHT_ITEM || item.id == WEIGHT_ITEM);
    if has_bmi_feeder && !config.domains.contains_key(BODY_DOMAIN) {
        errors.push(format!(
            "domains: {HEIGHT_ITEM}/{WEIGHT_ITEM} items require a '{BODY_DOMAIN}' domain"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_item(config: &Config, item: &Item, errors: &mut Vec<String>) {
    let id = &item.id;

    // Hazard table
    if item.hr.len() < 2 {
        errors.push(format!("items.{id}: hr must have at least 2 entries"));
    }
    for (i, hr) in item.hr.iter().enumerate() {
        if !hr.is_finite() || *hr <= 0.0 {
            errors.push(format!("items.{id}: hr[{i}] must be a finite value > 0"));
        }
    }
    if let Some(missing_hr) = item.missing_hr {
        if !missing_hr.is_finite() || missing_hr <= 0.0 {
            errors.push(format!("items.{id}: missing_hr must be a finite value > 0"));
        }
    }
    if let Some(ref bins) = item.bins {
        if bins.len() != item.hr.len() {
            errors.push(format!(
                "items.{id}: bins has {} labels but hr has {} entries",
                bins.len(),
                item.hr.len()
            ));
        }
    }

    // Domain reference
    if !config.domains.contains_key(&item.domain) {
        errors.push(format!("items.{id}: unknown domain '{}'", item.domain));
    }

    // Classification rule shape
    let max_bin = item.hr.len().saturating_sub(1);
    if let Some(ref options) = item.options {
        for (code, bin) in options {
            if *bin > max_bin {
                errors.push(format!(
                    "items.{id}: options['{code}'] maps to bin {bin}, max is {max_bin}"
                ));
            }
        }
    }
    if let Some(ref bands) = item.options_range {
        for (i, band) in bands.iter().enumerate() {
            if band.bin > max_bin {
                errors.push(format!(
                    "items.{id}: options_range[{i}] maps to bin {}, max is {max_bin}",
                    band.bin
                ));
            }
            if band.min.is_some_and(f64::is_nan) || band.max.is_some_and(f64::is_nan) {
                errors.push(format!("items.{id}: options_range[{i}] bounds must not be NaN"));
            } else if let (Some(lo), Some(hi)) = (band.min, band.max) {
                if lo > hi {
                    errors.push(format!("items.{id}: options_range[{i}] has min > max"));
                }
            }
        }
    }
    if item.options.is_some() && item.options_range.is_some() {
        errors.push(format!(
            "items.{id}: options and options_range are mutually exclusive"
        ));
    }

    match item.input_type {
        Some(InputType::MultiSelect) => {
            if item.options.is_some() || item.options_range.is_some() {
                errors.push(format!(
                    "items.{id}: multi_select items cannot carry options or options_range"
                ));
            }
            if let Some(ref weights) = item.scoring_weights {
                for (label, weight) in weights {
                    if !weight.is_finite() || *weight < 0.0 {
                        errors.push(format!(
                            "items.{id}: scoring_weights['{label}'] must be a finite value >= 0"
                        ));
                    }
                }
            }
        }
        Some(InputType::FreeText) => {
            if item.options.is_some()
                || item.options_range.is_some()
                || item.scoring_weights.is_some()
                || item.score_mapping.is_some()
            {
                errors.push(format!("items.{id}: free_text items take no scoring fields"));
            }
        }
        None => {
            if item.scoring_weights.is_some() || item.score_mapping.is_some() {
                errors.push(format!(
                    "items.{id}: scoring_weights/score_mapping require input_type: multi_select"
                ));
            }
        }
    }
}
