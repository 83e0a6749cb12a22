//! Anomaly Detection Facade
//!
//! Unified re-exports for multi-metric anomaly detection.
//!
//! This facade provides a single entry point to:
//! - alarm and pool document types from SPI
//! - detector chain configuration from API
//! - the generic detector, pool, stores and rules from Core

// Re-export everything from API (includes the SPI types)
pub use anomaly_api::*;

// Re-export core modules for direct access
pub use anomaly_core::{catalog, generic, host, pool, reporter, rules, store};

pub use anomaly_core::{
    register_builtin_rules, CollectingReporter, DetectorPool, GenericDetector, HostPattern,
    JsonFileStore, MemoryStore, PoolEntryView, Rule, RuleRegistry, SequenceCatalog,
    TracingReporter, HOST_LABELS, LENGTH_MISMATCH_EXEMPT, MAX_STALENESS_MS, MIN_SPAN_MS,
};

pub use forecast_core::ForecastContext;
pub use sequence_core::{MemorySource, StaticParams};
pub use sequence_spi::{Labels, MetricQuery, ParamSource, Sequence, SequenceSource};
