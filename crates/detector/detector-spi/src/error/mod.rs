//! Error types for anomaly detectors.

mod detector_error;

pub use detector_error::{DetectorError, Result};
