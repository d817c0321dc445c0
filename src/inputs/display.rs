//! Helpers for the edge that faces the user.

use crate::{
    health::HealthStatus,
    models::{BodyFatInputs, Gender, MeasurementField},
};

/// Shown wherever a value cannot be computed.
pub const PLACEHOLDER: &str = "—";

pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_status(status: Option<HealthStatus>) -> &'static str {
    status.map_or(PLACEHOLDER, |s| s.as_str())
}

/// A stored measurement expressed in the user's preferred unit.
pub fn display_measurement(inputs: &BodyFatInputs, field: MeasurementField) -> Option<f64> {
    let unit = inputs.unit_preference_or_default();
    inputs
        .measurement(field)
        .map(|value| field.quantity().from_canonical(value, unit))
}

pub fn unit_label(inputs: &BodyFatInputs, field: MeasurementField) -> &'static str {
    field.quantity().unit_label(inputs.unit_preference_or_default())
}

/// Gender to pre-select in a form. Display only; formulas never see it.
pub fn display_gender(inputs: &BodyFatInputs) -> Gender {
    inputs.gender.unwrap_or(Gender::Male)
}
