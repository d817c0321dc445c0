//! Body composition formulas over canonical (cm/kg) measurements.
//!
//! Every function fails soft: invalid or insufficient input yields `None`,
//! never NaN, infinity or a clamped number.

pub mod bmi;
pub mod navy;

pub use bmi::bmi;
pub use navy::{body_fat_percent, body_fat_percent_female, body_fat_percent_male};
