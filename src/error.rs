//! Errors surfaced to callers of the input controller.

use thiserror::Error;

use crate::models::MeasurementField;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("stored inputs are still loading")]
    NotReady,

    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber {
        field: MeasurementField,
        value: String,
    },
}
