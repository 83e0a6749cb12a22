//! Detector error types

use sequence_spi::SequenceError;
use thiserror::Error;

/// Result type for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Errors that can occur during anomaly detection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Detector has not been fitted yet
    #[error("Detector must be fitted before detection")]
    NotFitted,

    /// Two masks (or a mask and its series) differ in length
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Forecasting required by the detector failed
    #[error("Forecast error: {0}")]
    Forecast(String),

    /// Sequence handling failed
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

impl DetectorError {
    /// Shorthand for [`DetectorError::InvalidParameter`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        DetectorError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_display() {
        let error = DetectorError::InsufficientData {
            required: 3,
            actual: 1,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient data: need at least 3 points, got 1"
        );
    }

    #[test]
    fn test_invalid_parameter_display() {
        let error = DetectorError::invalid("alpha", "must be in (0, 1)");
        assert_eq!(error.to_string(), "Invalid parameter 'alpha': must be in (0, 1)");
    }

    #[test]
    fn test_length_mismatch_display() {
        let error = DetectorError::LengthMismatch { left: 5, right: 4 };
        assert_eq!(error.to_string(), "Length mismatch: 5 vs 4");
    }

    #[test]
    fn test_from_sequence_error() {
        let error: DetectorError = SequenceError::InvalidPeriod("1".to_string()).into();
        assert_eq!(error.to_string(), "Invalid period: 1");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DetectorError>();
    }
}
