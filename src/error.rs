//! Pipeline error types.
//!
//! The prediction client is the only place transport failures are turned
//! into these kinds. Everything here is `Clone` so the last failure can live
//! in the visualization state.

use std::fmt;

use thiserror::Error;

/// Form field that failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Tenure,
    MonthlyCharges,
    Contract,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Tenure => write!(f, "tenure"),
            FormField::MonthlyCharges => write!(f, "monthly-charges"),
            FormField::Contract => write!(f, "contract"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("invalid value for {field}: {value:?}")]
pub struct ValidationError {
    pub field: FormField,
    pub value: String,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PredictionError {
    /// Connection failure, timeout, or an unparsable response body.
    #[error("scoring service unreachable: {0}")]
    Network(String),

    #[error("scoring service returned HTTP {status}")]
    Service { status: u16 },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
