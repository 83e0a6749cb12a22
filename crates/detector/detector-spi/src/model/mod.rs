//! Detector output model.

mod anomaly_mask;

pub use anomaly_mask::AnomalyMask;
