//! Anomaly detection error types.

use detector_spi::DetectorError;
use forecast_spi::ForecastError;
use sequence_spi::SequenceError;
use thiserror::Error;

/// Anomaly detection errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnomalyError {
    #[error("Invalid configuration: {name} - {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("Reporting failed: {0}")]
    Report(String),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Result type for anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let error = AnomalyError::InvalidConfig {
            name: "detector_info".to_string(),
            reason: "must not be empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration: detector_info - must not be empty"
        );
    }

    #[test]
    fn test_wrapped_errors_are_transparent() {
        let error: AnomalyError = DetectorError::LengthMismatch { left: 3, right: 4 }.into();
        assert_eq!(error.to_string(), "Length mismatch: 3 vs 4");

        let error: AnomalyError = ForecastError::NotFitted.into();
        assert_eq!(error.to_string(), "Model must be fitted before forecasting");
    }

    #[test]
    fn test_all_error_variants_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnomalyError>();
    }
}
