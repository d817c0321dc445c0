use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Green => "green",
            HealthStatus::Yellow => "yellow",
            HealthStatus::Red => "red",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a body fat percentage is judged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BodyFatPolicy {
    /// Navy maximum allowed percentage by gender and age bracket.
    /// Green at or under the limit, red above. Needs an adult age.
    #[default]
    AgeBanded,
    /// Age-independent green/yellow/red bands.
    FixedBand,
}

impl BodyFatPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFatPolicy::AgeBanded => "age-banded",
            BodyFatPolicy::FixedBand => "fixed-band",
        }
    }
}

impl FromStr for BodyFatPolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "age-banded" | "age_banded" => Ok(BodyFatPolicy::AgeBanded),
            "fixed-band" | "fixed_band" => Ok(BodyFatPolicy::FixedBand),
            other => Err(anyhow!("unknown body fat policy '{other}'")),
        }
    }
}

/// How a BMI value is judged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BmiPolicy {
    /// Normal range green, everything else red.
    #[default]
    TwoBand,
    /// Normal range green, borderline yellow, everything else red.
    ThreeBand,
}

impl BmiPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiPolicy::TwoBand => "two-band",
            BmiPolicy::ThreeBand => "three-band",
        }
    }
}

impl FromStr for BmiPolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "two-band" | "two_band" => Ok(BmiPolicy::TwoBand),
            "three-band" | "three_band" => Ok(BmiPolicy::ThreeBand),
            other => Err(anyhow!("unknown BMI policy '{other}'")),
        }
    }
}
