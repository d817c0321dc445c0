use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{BodyFatInputs, Gender, MeasurementField},
    units::UnitSystem,
};

/// The single durable record of the current session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedInputs {
    #[serde(flatten)]
    pub inputs: BodyFatInputs,
    pub updated_at: DateTime<Utc>,
}

impl PersistedInputs {
    /// Applies `patch` over `existing` (or an empty record) and stamps it.
    pub fn merged(existing: Option<&PersistedInputs>, patch: &InputPatch, now: DateTime<Utc>) -> Self {
        let mut inputs = existing.map(|e| e.inputs.clone()).unwrap_or_default();
        patch.apply_to(&mut inputs);
        Self {
            inputs,
            updated_at: next_updated_at(existing.map(|e| e.updated_at), now),
        }
    }
}

/// Timestamps are kept at microsecond precision and always move forward,
/// even when the wall clock does not.
pub fn next_updated_at(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// Field-level partial update.
///
/// For every field `None` keeps the stored value, `Some(None)` clears it and
/// `Some(Some(v))` overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputPatch {
    pub gender: Option<Option<Gender>>,
    pub age: Option<Option<u32>>,
    pub unit_preference: Option<Option<UnitSystem>>,
    pub height_cm: Option<Option<f64>>,
    pub weight_kg: Option<Option<f64>>,
    pub neck_cm: Option<Option<f64>>,
    pub abdomen_cm: Option<Option<f64>>,
    pub waist_cm: Option<Option<f64>>,
    pub hip_cm: Option<Option<f64>>,
}

impl InputPatch {
    /// A patch that rewrites every field to match `inputs`.
    pub fn full(inputs: &BodyFatInputs) -> Self {
        Self {
            gender: Some(inputs.gender),
            age: Some(inputs.age),
            unit_preference: Some(inputs.unit_preference),
            height_cm: Some(inputs.height_cm),
            weight_kg: Some(inputs.weight_kg),
            neck_cm: Some(inputs.neck_cm),
            abdomen_cm: Some(inputs.abdomen_cm),
            waist_cm: Some(inputs.waist_cm),
            hip_cm: Some(inputs.hip_cm),
        }
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_age(mut self, age: Option<u32>) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_measurement(mut self, field: MeasurementField, value: Option<f64>) -> Self {
        *self.measurement_slot(field) = Some(value);
        self
    }

    fn measurement_slot(&mut self, field: MeasurementField) -> &mut Option<Option<f64>> {
        match field {
            MeasurementField::HeightCm => &mut self.height_cm,
            MeasurementField::WeightKg => &mut self.weight_kg,
            MeasurementField::NeckCm => &mut self.neck_cm,
            MeasurementField::AbdomenCm => &mut self.abdomen_cm,
            MeasurementField::WaistCm => &mut self.waist_cm,
            MeasurementField::HipCm => &mut self.hip_cm,
        }
    }

    pub fn apply_to(&self, inputs: &mut BodyFatInputs) {
        fn assign<T: Copy>(slot: &mut Option<T>, update: Option<Option<T>>) {
            if let Some(value) = update {
                *slot = value;
            }
        }

        assign(&mut inputs.gender, self.gender);
        assign(&mut inputs.age, self.age);
        assign(&mut inputs.unit_preference, self.unit_preference);
        assign(&mut inputs.height_cm, self.height_cm);
        assign(&mut inputs.weight_kg, self.weight_kg);
        assign(&mut inputs.neck_cm, self.neck_cm);
        assign(&mut inputs.abdomen_cm, self.abdomen_cm);
        assign(&mut inputs.waist_cm, self.waist_cm);
        assign(&mut inputs.hip_cm, self.hip_cm);
    }

    /// Combines two patches issued in order; fields set by `later` win.
    pub fn then(self, later: InputPatch) -> InputPatch {
        InputPatch {
            gender: later.gender.or(self.gender),
            age: later.age.or(self.age),
            unit_preference: later.unit_preference.or(self.unit_preference),
            height_cm: later.height_cm.or(self.height_cm),
            weight_kg: later.weight_kg.or(self.weight_kg),
            neck_cm: later.neck_cm.or(self.neck_cm),
            abdomen_cm: later.abdomen_cm.or(self.abdomen_cm),
            waist_cm: later.waist_cm.or(self.waist_cm),
            hip_cm: later.hip_cm.or(self.hip_cm),
        }
    }
}
