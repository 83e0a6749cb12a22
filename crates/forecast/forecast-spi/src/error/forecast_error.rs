//! Forecast error types

use sequence_spi::SequenceError;
use thiserror::Error;

/// Result type for forecast operations
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during forecasting operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Forecast horizon is not a positive finite number of seconds
    #[error("Invalid horizon: {0} seconds")]
    InvalidHorizon(f64),

    /// Model has not been fitted
    #[error("Model must be fitted before forecasting")]
    NotFitted,

    /// Numerical computation error
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Sequence handling failed
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}
