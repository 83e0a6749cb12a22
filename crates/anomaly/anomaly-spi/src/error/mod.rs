//! Error types for anomaly detection.

mod anomaly_error;
mod pool_error;

pub use anomaly_error::{AnomalyError, Result};
pub use pool_error::PoolError;
