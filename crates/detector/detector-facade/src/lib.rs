//! Detector Facade
//!
//! High-level, simplified API for anomaly detection.
//!
//! This crate provides a unified entry point for all detector
//! functionality, re-exporting the most commonly used types and traits.

// Re-export everything from detector-api
pub use detector_api::*;

// Re-export prelude for convenience
pub use detector_api::prelude;

// Re-export implementations from core
pub use detector_core::{
    build, AnyOfDetector, EsdTestDetector, ForecastDetector, GradientDetector, IncreaseDetector,
    IqrBounds, IqrDetector, MinimumLength, QuantileDetector, SeasonalDetector, ShiftDetector,
    ThresholdDetector,
};
