use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};

use crate::{
    health::{BmiPolicy, BodyFatPolicy, HealthClassifier},
    store::StoreKind,
};

pub const DATA_DIR_VAR: &str = "BODYFAT_DATA_DIR";
pub const STORE_VAR: &str = "BODYFAT_STORE";
pub const BODY_FAT_POLICY_VAR: &str = "BODYFAT_BODY_FAT_POLICY";
pub const BMI_POLICY_VAR: &str = "BODYFAT_BMI_POLICY";
pub const DEBUG_VAR: &str = "BODYFAT_DEBUG";

const APP_DIR_NAME: &str = "bodyfat";
const FALLBACK_DATA_DIR: &str = ".bodyfat";

/// Runtime configuration for one calculator session.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorSettings {
    pub data_dir: PathBuf,
    pub store: StoreKind,
    pub body_fat_policy: BodyFatPolicy,
    pub bmi_policy: BmiPolicy,
    pub debug: bool,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: StoreKind::default(),
            body_fat_policy: BodyFatPolicy::default(),
            bmi_policy: BmiPolicy::default(),
            debug: false,
        }
    }
}

impl CalculatorSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unset or blank keys keep their
    /// defaults; values that do not parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(dir) = value(DATA_DIR_VAR) {
            settings.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(store) = parse_var(&value, STORE_VAR)? {
            settings.store = store;
        }
        if let Some(policy) = parse_var(&value, BODY_FAT_POLICY_VAR)? {
            settings.body_fat_policy = policy;
        }
        if let Some(policy) = parse_var(&value, BMI_POLICY_VAR)? {
            settings.bmi_policy = policy;
        }
        if let Some(flag) = value(DEBUG_VAR) {
            settings.debug = parse_flag(&flag).with_context(|| format!("invalid {DEBUG_VAR}"))?;
        }

        Ok(settings)
    }

    pub fn classifier(&self) -> HealthClassifier {
        HealthClassifier::new(self.body_fat_policy, self.bmi_policy)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

fn parse_var<T>(value: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr<Err = anyhow::Error>,
{
    value(key)
        .map(|raw| raw.parse::<T>().with_context(|| format!("invalid {key}")))
        .transpose()
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}
