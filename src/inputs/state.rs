use serde::{Deserialize, Serialize};

use crate::{
    error::InputError,
    models::{BodyFatInputs, MeasurementField},
    units::UnitSystem,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ControllerStatus {
    /// Stored inputs are being read; edits are refused.
    #[default]
    Loading,
    Ready,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputState {
    pub status: ControllerStatus,
    pub inputs: BodyFatInputs,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.status == ControllerStatus::Ready
    }

    /// Moves Loading → Ready with `inputs`. Returns false, leaving the state
    /// untouched, if loading already finished.
    pub fn finish_loading(&mut self, inputs: BodyFatInputs) -> bool {
        if self.is_ready() {
            return false;
        }
        *self = Self {
            status: ControllerStatus::Ready,
            inputs,
        };
        true
    }
}

/// Parses a typed field value into canonical units.
///
/// Blank text clears the field (`None`), it never becomes zero.
pub fn parse_measurement(
    field: MeasurementField,
    raw: &str,
    source_unit: UnitSystem,
) -> Result<Option<f64>, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = || InputError::InvalidNumber {
        field,
        value: raw.to_string(),
    };
    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    Ok(Some(to_canonical(field, value, source_unit)))
}

pub fn to_canonical(field: MeasurementField, value: f64, source_unit: UnitSystem) -> f64 {
    if source_unit.is_canonical() {
        value
    } else {
        field.quantity().to_canonical(value, source_unit)
    }
}
