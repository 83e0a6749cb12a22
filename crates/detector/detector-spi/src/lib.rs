//! Detector Service Provider Interface
//!
//! Defines the contract every anomaly detector implements, the boolean
//! mask detectors produce and the detector error type.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::Detector;
pub use error::{DetectorError, Result};
pub use model::AnomalyMask;
