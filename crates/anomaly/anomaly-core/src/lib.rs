//! Anomaly Detection Core
//!
//! The generic multi-metric detector, the in-memory sequence catalog, the
//! detector pool with its stores, alarm reporters and the built-in rule
//! registry.

pub mod catalog;
pub mod generic;
pub mod host;
pub mod pool;
pub mod reporter;
pub mod rules;
pub mod store;

pub use catalog::{SequenceCatalog, MAX_STALENESS_MS, MIN_SPAN_MS};
pub use generic::{GenericDetector, LENGTH_MISMATCH_EXEMPT};
pub use host::{HostPattern, HOST_LABELS};
pub use pool::{DetectorPool, PoolEntryView};
pub use reporter::{CollectingReporter, TracingReporter};
pub use rules::{register_builtin_rules, Rule, RuleRegistry};
pub use store::{JsonFileStore, MemoryStore};

pub use anomaly_api::{DetectorEntry, DetectorInfo};
pub use anomaly_spi::{
    Alarm, AlarmInfo, AlarmLevel, AlarmReporter, AlarmType, AnomalyError, Diagnoser,
    PoolDocument, PoolEntryConfig, PoolError, PoolStore, Result,
};
