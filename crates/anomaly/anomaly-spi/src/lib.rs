//! Anomaly Detection Service Provider Interface
//!
//! Defines the alarm model, the persisted detector-pool document and the
//! contracts of the reporting, persistence and diagnosis collaborators.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{AlarmReporter, Diagnoser, PoolStore};
pub use error::{AnomalyError, PoolError, Result};
pub use model::{
    Alarm, AlarmInfo, AlarmLevel, AlarmType, DetectorRecord, PoolDocument, PoolEntryConfig,
};
