use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{
    body_composition::{bmi, body_fat_percent},
    models::{BodyFatInputs, Gender},
};

use super::{BmiPolicy, BodyFatPolicy, HealthStatus};

const BMI_NORMAL_MIN: f64 = 18.5;
const BMI_NORMAL_MAX: f64 = 24.9;
const BMI_BORDERLINE_MIN: f64 = 17.0;
const BMI_BORDERLINE_MAX: f64 = 30.0;

const ADULT_AGE: u32 = 18;

/// Navy maximum body fat percentage for an adult, by age bracket.
fn navy_limit(age: u32, gender: Gender) -> Option<f64> {
    if age < ADULT_AGE {
        return None;
    }
    let (male, female) = match age {
        0..=21 => (22.0, 33.0),
        22..=29 => (23.0, 34.0),
        30..=39 => (24.0, 35.0),
        _ => (26.0, 36.0),
    };
    Some(match gender {
        Gender::Male => male,
        Gender::Female => female,
    })
}

/// Inclusive green and yellow bands. Anything outside both is red,
/// including values that fall between the two.
fn fixed_bands(gender: Gender) -> (RangeInclusive<f64>, RangeInclusive<f64>) {
    match gender {
        Gender::Male => (8.0..=19.0, 20.0..=24.0),
        Gender::Female => (21.0..=32.0, 33.0..=38.0),
    }
}

pub fn bmi_status(bmi: Option<f64>, policy: BmiPolicy) -> Option<HealthStatus> {
    let value = bmi.filter(|v| v.is_finite())?;

    if (BMI_NORMAL_MIN..=BMI_NORMAL_MAX).contains(&value) {
        return Some(HealthStatus::Green);
    }

    let status = match policy {
        BmiPolicy::TwoBand => HealthStatus::Red,
        BmiPolicy::ThreeBand => {
            let underweight = (BMI_BORDERLINE_MIN..BMI_NORMAL_MIN).contains(&value);
            let overweight = value > BMI_NORMAL_MAX && value < BMI_BORDERLINE_MAX;
            if underweight || overweight {
                HealthStatus::Yellow
            } else {
                HealthStatus::Red
            }
        }
    };
    Some(status)
}

pub fn body_fat_status(
    percent: Option<f64>,
    gender: Gender,
    age: Option<u32>,
    policy: BodyFatPolicy,
) -> Option<HealthStatus> {
    let percent = percent.filter(|v| v.is_finite())?;

    match policy {
        BodyFatPolicy::AgeBanded => {
            let limit = navy_limit(age?, gender)?;
            Some(if percent <= limit {
                HealthStatus::Green
            } else {
                HealthStatus::Red
            })
        }
        BodyFatPolicy::FixedBand => {
            let (green, yellow) = fixed_bands(gender);
            Some(if green.contains(&percent) {
                HealthStatus::Green
            } else if yellow.contains(&percent) {
                HealthStatus::Yellow
            } else {
                HealthStatus::Red
            })
        }
    }
}

/// Everything computed from the inputs. Never persisted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedValues {
    pub body_fat_percent: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat_status: Option<HealthStatus>,
    pub bmi_status: Option<HealthStatus>,
}

/// Active classification policies. One policy per rule, never mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthClassifier {
    pub body_fat: BodyFatPolicy,
    pub bmi: BmiPolicy,
}

impl HealthClassifier {
    pub fn new(body_fat: BodyFatPolicy, bmi: BmiPolicy) -> Self {
        Self { body_fat, bmi }
    }

    pub fn bmi_status(&self, bmi: Option<f64>) -> Option<HealthStatus> {
        bmi_status(bmi, self.bmi)
    }

    pub fn body_fat_status(
        &self,
        percent: Option<f64>,
        gender: Gender,
        age: Option<u32>,
    ) -> Option<HealthStatus> {
        body_fat_status(percent, gender, age, self.body_fat)
    }

    /// Runs the formulas and both status rules over the current inputs.
    pub fn classify(&self, inputs: &BodyFatInputs) -> DerivedValues {
        let record = inputs.measurement_record();
        let body_fat_percent = record.as_ref().and_then(body_fat_percent);
        let bmi_value = match (inputs.weight_kg, inputs.height_cm) {
            (Some(weight), Some(height)) => bmi(weight, height),
            _ => None,
        };
        let body_fat_status = record
            .as_ref()
            .and_then(|r| self.body_fat_status(body_fat_percent, r.gender, r.age));

        DerivedValues {
            body_fat_percent,
            bmi: bmi_value,
            body_fat_status,
            bmi_status: self.bmi_status(bmi_value),
        }
    }
}
