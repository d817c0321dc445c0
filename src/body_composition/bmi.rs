use crate::units::round_to_tenth;

/// Body mass index, `weight (kg) / height (m)²`, rounded to one decimal.
///
/// Both inputs must be finite and strictly positive.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(weight_kg) || !valid(height_cm) {
        return None;
    }

    let height_m = height_cm / 100.0;
    let value = weight_kg / (height_m * height_m);
    value.is_finite().then(|| round_to_tenth(value))
}
