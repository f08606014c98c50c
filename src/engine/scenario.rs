use indexmap::IndexMap;
use serde::Serialize;

use super::classify;
use super::compute::{PreparedItem, ThaEngine};
use crate::answer::AnswerMap;
use crate::error::Result;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Outcome of comparing a proposed answer set against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfOutcome {
    /// Change in age acceleration, in years; negative is an improvement
    pub delta_years: f64,

    /// True Health Age under the proposed answers
    #[serde(rename = "new_THA")]
    pub new_tha: f64,

    /// True Health Age under the baseline answers
    #[serde(rename = "old_THA")]
    pub old_tha: f64,
}

impl ThaEngine {
    /// Evaluate a set of answer overrides against a baseline.
    ///
    /// `changes` is shallow-merged over `answers`: an override replaces
    /// the baseline answer for the same item, everything else stays. Both
    /// evaluations run under the full pipeline, caps and clamps included,
    /// so a change inside an already-capped domain can show a delta of
    /// zero.
    pub fn what_if(
        &self,
        chron_age_years: f64,
        answers: &AnswerMap,
        changes: &AnswerMap,
    ) -> Result<WhatIfOutcome> {
        let mut proposed = answers.clone();
        proposed.extend(
            changes
                .iter()
                .map(|(id, answer)| (id.clone(), answer.clone())),
        );

        let baseline = self.compute(chron_age_years, answers)?;
        let changed = self.compute(chron_age_years, &proposed)?;

        Ok(WhatIfOutcome {
            delta_years: changed.age_accel - baseline.age_accel,
            new_tha: changed.tha,
            old_tha: baseline.tha,
        })
    }

    /// Months of age acceleration each item would shed if its answer
    /// moved exactly one bin toward the favorable end.
    ///
    /// Every item reports a figure. Unanswered, unclassifiable, and
    /// already-optimal items report 0.0; a classification failure here is
    /// not an evaluation failure. Gains are computed on the raw item
    /// contribution, before domain caps.
    pub fn one_step_gains_months(&self, answers: &AnswerMap) -> IndexMap<String, f64> {
        self.items
            .iter()
            .map(|item| (item.id.clone(), self.one_step_gain(item, answers)))
            .collect()
    }

    fn one_step_gain(&self, item: &PreparedItem, answers: &AnswerMap) -> f64 {
        let answer = match answers.get(&item.id) {
            Some(answer) => answer,
            None => return 0.0,
        };
        let current = match classify::classify(&item.rule, &item.id, item.hr.len(), answer) {
            Ok(Some(bin)) => bin,
            Ok(None) | Err(_) => return 0.0,
        };
        let best = item.hr.len() - 1;
        if current >= best {
            return 0.0;
        }
        let gain_years = (item.hr[current].ln() - item.hr[current + 1].ln()) / self.b;
        gain_years * MONTHS_PER_YEAR
    }
}
