//! Sequence error types

use thiserror::Error;

/// Result type for sequence operations
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Errors raised while building or transforming a sequence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// Timestamps and values differ in length
    #[error("Length mismatch: {timestamps} timestamps, {values} values")]
    LengthMismatch { timestamps: usize, values: usize },

    /// Timestamps are not strictly increasing
    #[error("Timestamps must be strictly increasing (violated at index {index})")]
    NotIncreasing { index: usize },

    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid period for seasonality
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The time-series source failed to answer a query
    #[error("Source error: {0}")]
    Source(String),
}
