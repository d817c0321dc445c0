use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

use crate::units::{Quantity, UnitSystem};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(anyhow!("unknown gender '{other}'")),
        }
    }
}

/// The six numeric measurement fields a user can enter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementField {
    HeightCm,
    WeightKg,
    NeckCm,
    AbdomenCm,
    WaistCm,
    HipCm,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 6] = [
        MeasurementField::HeightCm,
        MeasurementField::WeightKg,
        MeasurementField::NeckCm,
        MeasurementField::AbdomenCm,
        MeasurementField::WaistCm,
        MeasurementField::HipCm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementField::HeightCm => "heightCm",
            MeasurementField::WeightKg => "weightKg",
            MeasurementField::NeckCm => "neckCm",
            MeasurementField::AbdomenCm => "abdomenCm",
            MeasurementField::WaistCm => "waistCm",
            MeasurementField::HipCm => "hipCm",
        }
    }

    pub fn quantity(&self) -> Quantity {
        match self {
            MeasurementField::WeightKg => Quantity::Mass,
            _ => Quantity::Length,
        }
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw last-known inputs of the current session, canonical units.
///
/// Values are kept as entered (after unit conversion); validity is judged by
/// the formulas, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BodyFatInputs {
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub unit_preference: Option<UnitSystem>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub neck_cm: Option<f64>,
    #[serde(default)]
    pub abdomen_cm: Option<f64>,
    #[serde(default)]
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub hip_cm: Option<f64>,
}

impl BodyFatInputs {
    pub fn measurement(&self, field: MeasurementField) -> Option<f64> {
        match field {
            MeasurementField::HeightCm => self.height_cm,
            MeasurementField::WeightKg => self.weight_kg,
            MeasurementField::NeckCm => self.neck_cm,
            MeasurementField::AbdomenCm => self.abdomen_cm,
            MeasurementField::WaistCm => self.waist_cm,
            MeasurementField::HipCm => self.hip_cm,
        }
    }

    pub fn set_measurement(&mut self, field: MeasurementField, value: Option<f64>) {
        let slot = match field {
            MeasurementField::HeightCm => &mut self.height_cm,
            MeasurementField::WeightKg => &mut self.weight_kg,
            MeasurementField::NeckCm => &mut self.neck_cm,
            MeasurementField::AbdomenCm => &mut self.abdomen_cm,
            MeasurementField::WaistCm => &mut self.waist_cm,
            MeasurementField::HipCm => &mut self.hip_cm,
        };
        *slot = value;
    }

    pub fn unit_preference_or_default(&self) -> UnitSystem {
        self.unit_preference.unwrap_or_default()
    }

    /// Formula view of the inputs; `None` until a gender has been chosen.
    pub fn measurement_record(&self) -> Option<MeasurementRecord> {
        let gender = self.gender?;
        Some(MeasurementRecord {
            gender,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            neck_cm: self.neck_cm,
            abdomen_cm: self.abdomen_cm,
            waist_cm: self.waist_cm,
            hip_cm: self.hip_cm,
            age: self.age,
        })
    }
}

/// Canonical-unit record consumed by the body composition formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub gender: Gender,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub neck_cm: Option<f64>,
    /// Male only.
    pub abdomen_cm: Option<f64>,
    /// Female only.
    pub waist_cm: Option<f64>,
    /// Female only.
    pub hip_cm: Option<f64>,
    pub age: Option<u32>,
}

impl MeasurementRecord {
    pub fn new(gender: Gender) -> Self {
        Self {
            gender,
            height_cm: None,
            weight_kg: None,
            neck_cm: None,
            abdomen_cm: None,
            waist_cm: None,
            hip_cm: None,
            age: None,
        }
    }
}
