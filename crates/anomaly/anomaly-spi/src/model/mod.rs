//! Data models for anomaly detection.

mod alarm;
mod pool_document;

pub use alarm::{Alarm, AlarmInfo, AlarmLevel, AlarmType};
pub use pool_document::{DetectorRecord, PoolDocument, PoolEntryConfig};
