//! Traits implemented by detectors.

mod detector;

pub use detector::Detector;
