use indexmap::IndexMap;
use serde::Serialize;

use super::classify::{self, ClassifyRule};
use super::derived::{self, BMI_ITEM, BODY_DOMAIN, HEIGHT_ITEM, WEIGHT_ITEM};
use super::validation;
use crate::answer::{Answer, AnswerMap};
use crate::config::{Config, DomainCaps, Item};
use crate::error::{Result, ThaError};

/// Presentation rank for items without an explicit `order`.
const UNORDERED_RANK: u32 = 999;

/// Group tag for items without an explicit `group`.
const UNGROUPED: &str = "ungrouped";

/// Gompertz slope for a mortality rate doubling time, in 1/years.
pub fn gompertz_b(mrdt_years: f64) -> Result<f64> {
    if !mrdt_years.is_finite() || mrdt_years <= 0.0 {
        return Err(ThaError::Configuration(vec![
            "mrdt_years: must be a finite value > 0".to_string(),
        ]));
    }
    Ok(std::f64::consts::LN_2 / mrdt_years)
}

/// One questionnaire item, validated and ready to score.
#[derive(Debug, Clone)]
pub(crate) struct PreparedItem {
    pub(crate) id: String,
    pub(crate) domain: String,
    pub(crate) hr: Vec<f64>,
    pub(crate) missing_hr: f64,
    pub(crate) rule: ClassifyRule,
}

/// The scoring engine.
///
/// Built once from a validated [`Config`] and reusable for any number of
/// evaluations; computing never mutates it, so equal inputs always
/// produce equal results.
#[derive(Debug, Clone)]
pub struct ThaEngine {
    pub(crate) version: String,
    pub(crate) b: f64,
    pub(crate) age_clamp_years: f64,
    pub(crate) domains: IndexMap<String, DomainCaps>,
    pub(crate) items: Vec<PreparedItem>,
    pub(crate) groups: IndexMap<String, Vec<String>>,
}

/// Full output of one evaluation.
///
/// Domain years are reported after the domain clamp; they are exactly
/// what fed the grand total. Item years are the raw pre-clamp
/// contributions, so over a clamped domain they can sum past the domain
/// figure. The asymmetry is intentional: item figures show each answer's
/// unbounded impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThaResult {
    /// Chronological age the evaluation ran against
    #[serde(rename = "chronAgeYears")]
    pub chron_age_years: f64,

    /// True Health Age: chronological age plus the age acceleration
    #[serde(rename = "THA")]
    pub tha: f64,

    /// Signed acceleration in years; positive means biologically older
    #[serde(rename = "AgeAccel")]
    pub age_accel: f64,

    /// Post-clamp years contribution per domain
    #[serde(rename = "domainYears")]
    pub domain_years: IndexMap<String, f64>,

    /// Pre-clamp years contribution per item, plus `bmi_calculated`
    #[serde(rename = "itemYears")]
    pub item_years: IndexMap<String, f64>,

    /// Version tag of the configuration that produced this result
    pub algo_version: String,

    /// Gompertz slope used for the years conversion
    pub b: f64,

    /// Group tag to item ids, in presentation order
    pub groups: IndexMap<String, Vec<String>>,
}

impl ThaEngine {
    /// Validate `config` and prepare it for scoring.
    ///
    /// Every configuration violation is collected into a single
    /// [`ThaError::Configuration`], each entry naming the offending
    /// domain or item.
    pub fn new(config: Config) -> Result<ThaEngine> {
        validation::validate_config(&config).map_err(ThaError::Configuration)?;
        let b = gompertz_b(config.mrdt_years)?;

        let mut sorted = config.items;
        sorted.sort_by_key(|item| item.order.unwrap_or(UNORDERED_RANK));

        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut items = Vec::with_capacity(sorted.len());
        for item in sorted {
            groups
                .entry(item.group.clone().unwrap_or_else(|| UNGROUPED.to_string()))
                .or_default()
                .push(item.id.clone());
            warn_if_risk_order_inverted(&item);
            items.push(PreparedItem {
                rule: ClassifyRule::resolve(&item),
                missing_hr: item.missing_hr.unwrap_or(1.0),
                id: item.id,
                domain: item.domain,
                hr: item.hr,
            });
        }

        let engine = ThaEngine {
            version: config.algo_version,
            b,
            age_clamp_years: config.age_clamp_years,
            domains: config.domains,
            items,
            groups,
        };
        log::info!(
            "engine ready: version={}, b={:.5}, {} items across {} domains",
            engine.version,
            engine.b,
            engine.items.len(),
            engine.domains.len()
        );
        Ok(engine)
    }

    /// Gompertz slope used by this engine.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Version tag from the configuration.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Default answers for smoke runs: every item at its middle bin.
    pub fn middle_bin_answers(&self) -> AnswerMap {
        self.items
            .iter()
            .map(|item| (item.id.clone(), Answer::Bin(item.hr.len() / 2)))
            .collect()
    }

    /// Run one full evaluation.
    ///
    /// Classifies every answer, sums ln-hazards per domain, applies the
    /// domain caps, converts the total to years via the Gompertz slope,
    /// and clamps the final acceleration. Any classification failure
    /// aborts the whole run; unanswered items contribute their
    /// `missing_hr` (1.0 unless configured, i.e. nothing).
    pub fn compute(&self, chron_age_years: f64, answers: &AnswerMap) -> Result<ThaResult> {
        let mut domain_ln: IndexMap<String, f64> =
            self.domains.keys().map(|name| (name.clone(), 0.0)).collect();
        let mut item_years: IndexMap<String, f64> = IndexMap::new();

        // Derived metric first: BMI folds into the body domain as a
        // synthetic item
        if let Some(ln_hr) = derived::bmi_ln_hr(answers)? {
            match domain_ln.get_mut(BODY_DOMAIN) {
                Some(total) => *total += ln_hr,
                None => {
                    return Err(ThaError::Configuration(vec![format!(
                        "domains: BMI contribution requires a '{BODY_DOMAIN}' domain"
                    )]))
                }
            }
            item_years.insert(BMI_ITEM.to_string(), ln_hr / self.b);
        }

        // Per-item ln-hazards
        for item in &self.items {
            // Height and weight only feed the BMI preprocessor
            if item.id == HEIGHT_ITEM || item.id == WEIGHT_ITEM {
                continue;
            }
            let bin = match answers.get(&item.id) {
                Some(answer) => classify::classify(&item.rule, &item.id, item.hr.len(), answer)?,
                None => None,
            };
            let ln_hr = item_ln_hr(item, bin)?;
            match domain_ln.get_mut(&item.domain) {
                Some(total) => *total += ln_hr,
                None => {
                    return Err(ThaError::Configuration(vec![format!(
                        "items.{}: unknown domain '{}'",
                        item.id, item.domain
                    )]))
                }
            }
            item_years.insert(item.id.clone(), ln_hr / self.b);
        }

        // Domain caps apply once, in ln space, after all items are summed
        for (name, caps) in &self.domains {
            if let Some(total) = domain_ln.get_mut(name) {
                let raw = *total;
                *total = raw.clamp(caps.ln_cap_lo, caps.ln_cap_hi);
                log::debug!("domain {name}: ln_sum={raw:.4}, clamped={total:.4}");
            }
        }

        let ln_total: f64 = domain_ln.values().sum();
        let age_accel =
            (ln_total / self.b).clamp(-self.age_clamp_years, self.age_clamp_years);
        log::debug!("ln_total={ln_total:.4}, age_accel={age_accel:.2}");

        let domain_years = domain_ln
            .into_iter()
            .map(|(name, ln)| (name, ln / self.b))
            .collect();

        Ok(ThaResult {
            chron_age_years,
            tha: chron_age_years + age_accel,
            age_accel,
            domain_years,
            item_years,
            algo_version: self.version.clone(),
            b: self.b,
            groups: self.groups.clone(),
        })
    }
}

/// ln-hazard of one item given its classified bin, or `missing_hr` when
/// the item never classified.
pub(crate) fn item_ln_hr(item: &PreparedItem, bin: Option<usize>) -> Result<f64> {
    let hr = match bin {
        Some(index) => item.hr[index],
        None => item.missing_hr,
    };
    if hr <= 0.0 {
        return Err(ThaError::InvalidHazardRatio {
            item: item.id.clone(),
        });
    }
    Ok(hr.ln())
}

/// A hazard table should not assign a higher hazard to a more favorable
/// bin; one-step gains turn negative when it does.
fn warn_if_risk_order_inverted(item: &Item) {
    if item.hr.windows(2).any(|pair| pair[0] < pair[1]) {
        log::warn!(
            "item '{}': hr is not monotonically non-increasing; one-step gains may be negative",
            item.id
        );
    }
}
