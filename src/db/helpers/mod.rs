use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{models::Gender, units::UnitSystem};

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_gender(value: Option<String>) -> Result<Option<Gender>> {
    value
        .map(|raw| raw.parse().context("failed to parse gender"))
        .transpose()
}

pub fn parse_optional_unit(value: Option<String>) -> Result<Option<UnitSystem>> {
    value
        .map(|raw| raw.parse().context("failed to parse unit_preference"))
        .transpose()
}
