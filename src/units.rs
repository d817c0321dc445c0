//! Metric/imperial conversions for length and mass.
//!
//! Canonical units are centimeters and kilograms. Everything stored or fed to
//! the formulas is canonical; conversions back to the user's unit are rounded
//! to one decimal because they only ever face the user.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// 1 in = 2.54 cm (exact).
pub const CM_PER_INCH: f64 = 2.54;
/// 1 kg ≈ 2.20462 lb.
pub const LB_PER_KG: f64 = 2.20462;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, UnitSystem::Metric)
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(anyhow!("unknown unit system '{other}'")),
        }
    }
}

/// Physical quantity a measurement field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Length,
    Mass,
}

impl Quantity {
    pub fn to_canonical(&self, value: f64, unit: UnitSystem) -> f64 {
        match self {
            Quantity::Length => length_to_canonical(value, unit),
            Quantity::Mass => mass_to_canonical(value, unit),
        }
    }

    pub fn from_canonical(&self, canonical: f64, unit: UnitSystem) -> f64 {
        match self {
            Quantity::Length => length_from_canonical(canonical, unit),
            Quantity::Mass => mass_from_canonical(canonical, unit),
        }
    }

    pub fn unit_label(&self, unit: UnitSystem) -> &'static str {
        match (self, unit) {
            (Quantity::Length, UnitSystem::Metric) => "cm",
            (Quantity::Length, UnitSystem::Imperial) => "in",
            (Quantity::Mass, UnitSystem::Metric) => "kg",
            (Quantity::Mass, UnitSystem::Imperial) => "lb",
        }
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LB_PER_KG
}

pub fn lb_to_kg(lb: f64) -> f64 {
    lb / LB_PER_KG
}

/// Converts a typed length to centimeters. Never rounds.
pub fn length_to_canonical(value: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => inches_to_cm(value),
    }
}

/// Converts centimeters to the display unit, rounded to one decimal for imperial.
pub fn length_from_canonical(canonical: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => canonical,
        UnitSystem::Imperial => round_to_tenth(cm_to_inches(canonical)),
    }
}

/// Converts a typed mass to kilograms. Never rounds.
pub fn mass_to_canonical(value: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => lb_to_kg(value),
    }
}

/// Converts kilograms to the display unit, rounded to one decimal for imperial.
pub fn mass_from_canonical(canonical: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => canonical,
        UnitSystem::Imperial => round_to_tenth(kg_to_lb(canonical)),
    }
}
