use thiserror::Error;

/// Rejections raised while building a [`Series`](crate::Series).
///
/// Detectors never see a series that failed these checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("reading {index} has a non-finite value ({value})")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("reading {index} is older than the reading before it")]
    NonMonotonicTimestamp { index: usize },

    #[error("sampling step must be positive, got {0}s")]
    InvalidStep(i64),
}

/// Rejections raised while parsing core vocabulary from text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClimateError {
    #[error("Unknown quantity: {0}")]
    UnknownQuantity(String),
}
