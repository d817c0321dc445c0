pub mod inputs;

pub use inputs::{BodyFatInputs, Gender, MeasurementField, MeasurementRecord};
