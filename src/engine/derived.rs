use crate::answer::{Answer, AnswerMap};
use crate::error::{Result, ThaError};

/// Item id of the height feeder answer, in inches.
pub(crate) const HEIGHT_ITEM: &str = "height";
/// Item id of the weight feeder answer, in pounds.
pub(crate) const WEIGHT_ITEM: &str = "weight";
/// Synthetic item id the BMI contribution is reported under.
pub(crate) const BMI_ITEM: &str = "bmi_calculated";
/// Domain that receives the BMI contribution.
pub(crate) const BODY_DOMAIN: &str = "body";

const CM_PER_INCH: f64 = 2.54;
const KG_PER_POUND: f64 = 0.453592;

/// Hazard ratio applied when height and weight are supplied but unusable.
const UNCOMPUTABLE_HR: f64 = 1.05;

/// ln-hazard of the BMI contribution.
///
/// Returns `Ok(None)` when height or weight was not answered at all; in
/// that case there is no contribution, not even the uncomputable penalty.
pub(crate) fn bmi_ln_hr(answers: &AnswerMap) -> Result<Option<f64>> {
    let (height, weight) = match (answers.get(HEIGHT_ITEM), answers.get(WEIGHT_ITEM)) {
        (Some(height), Some(weight)) => (height, weight),
        _ => return Ok(None),
    };

    let height_in = numeric_feeder(HEIGHT_ITEM, height)?;
    let weight_lb = numeric_feeder(WEIGHT_ITEM, weight)?;
    Ok(Some(category_ln_hr(bmi_from_imperial(height_in, weight_lb))))
}

/// BMI in kg/m² from imperial inputs, or `None` when not computable.
pub(crate) fn bmi_from_imperial(height_in: f64, weight_lb: f64) -> Option<f64> {
    if !height_in.is_finite() || !weight_lb.is_finite() || height_in <= 0.0 || weight_lb <= 0.0 {
        return None;
    }
    let height_m = height_in * CM_PER_INCH / 100.0;
    let weight_kg = weight_lb * KG_PER_POUND;
    Some(weight_kg / (height_m * height_m))
}

/// ln-hazard for a BMI value, by clinical category.
pub(crate) fn category_ln_hr(bmi: Option<f64>) -> f64 {
    let hr = match bmi {
        None => UNCOMPUTABLE_HR,
        Some(bmi) if bmi < 18.5 => 1.20, // underweight
        Some(bmi) if bmi < 25.0 => 1.00, // normal, the reference class
        Some(bmi) if bmi < 30.0 => 1.15, // overweight
        Some(bmi) if bmi < 35.0 => 1.40, // obese class I
        Some(_) => 1.80,                 // obese class II and above
    };
    hr.ln()
}

fn numeric_feeder(item: &str, answer: &Answer) -> Result<f64> {
    answer.as_number().ok_or_else(|| ThaError::BinClassification {
        item: item.to_string(),
        raw: answer.describe(),
    })
}
