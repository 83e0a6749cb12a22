//! Anomaly Detection API
//!
//! Typed configuration of detector chains and pool entries. The persisted
//! document keeps detector parameters untyped; the types here validate
//! them against the detector configuration schema.

use serde::{Deserialize, Serialize};

use detector_api::{DetectorConfig, DetectorError};
use sequence_spi::Labels;

// Re-export SPI types
pub use anomaly_spi::{
    Alarm, AlarmInfo, AlarmLevel, AlarmReporter, AlarmType, AnomalyError, DetectorRecord,
    Diagnoser, PoolDocument, PoolEntryConfig, PoolError, PoolStore, Result,
};

// ============================================================================
// Detector chain
// ============================================================================

/// One link of a detector chain: which series to fetch and how to judge it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DetectorRecord", into = "DetectorRecord")]
pub struct DetectorInfo {
    pub metric_name: String,
    /// Exact label filters; an empty value is filled from the main series
    pub metric_filter: Labels,
    /// Full-match regular expressions on labels
    pub metric_filter_like: Labels,
    pub detector: DetectorConfig,
}

impl DetectorInfo {
    pub fn new(metric_name: impl Into<String>, detector: DetectorConfig) -> Self {
        Self {
            metric_name: metric_name.into(),
            metric_filter: Labels::new(),
            metric_filter_like: Labels::new(),
            detector,
        }
    }

    pub fn filter(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.metric_filter.insert(label.into(), value.into());
        self
    }

    pub fn filter_like(mut self, label: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.metric_filter_like.insert(label.into(), pattern.into());
        self
    }
}

impl TryFrom<DetectorRecord> for DetectorInfo {
    type Error = DetectorError;

    fn try_from(record: DetectorRecord) -> std::result::Result<Self, Self::Error> {
        let detector = DetectorConfig::from_parts(&record.detector_kind, record.detector_kwargs)?;
        Ok(Self {
            metric_name: record.metric_name,
            metric_filter: record.metric_filter,
            metric_filter_like: record.metric_filter_like,
            detector,
        })
    }
}

impl From<DetectorInfo> for DetectorRecord {
    fn from(info: DetectorInfo) -> Self {
        let (detector_kind, detector_kwargs) = info.detector.to_parts();
        Self {
            metric_name: info.metric_name,
            metric_filter: info.metric_filter,
            metric_filter_like: info.metric_filter_like,
            detector_kind,
            detector_kwargs,
        }
    }
}

// ============================================================================
// Pool entry
// ============================================================================

/// A validated pool entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorEntry {
    pub running: bool,
    /// Detection window, seconds
    pub duration: u64,
    pub forecasting_seconds: Option<u64>,
    pub alarm_info: AlarmInfo,
    /// Main metric first
    pub detector_info: Vec<DetectorInfo>,
}

impl DetectorEntry {
    pub fn new(duration: u64, alarm_info: AlarmInfo, detector_info: Vec<DetectorInfo>) -> Self {
        Self {
            running: true,
            duration,
            forecasting_seconds: None,
            alarm_info,
            detector_info,
        }
    }

    pub fn with_forecasting(mut self, seconds: u64) -> Self {
        self.forecasting_seconds = Some(seconds);
        self
    }

    /// Validate a persisted entry.
    pub fn from_config(config: &PoolEntryConfig) -> std::result::Result<Self, PoolError> {
        if config.duration == 0 {
            return Err(PoolError::InvalidSchema("duration must be positive".to_string()));
        }
        if config.forecasting_seconds == Some(0) {
            return Err(PoolError::InvalidSchema(
                "forecasting_seconds must be positive".to_string(),
            ));
        }
        if config.detector_info.is_empty() {
            return Err(PoolError::InvalidSchema(
                "detector_info must contain at least one detector".to_string(),
            ));
        }
        let detector_info = config
            .detector_info
            .iter()
            .cloned()
            .map(|record| {
                let metric = record.metric_name.clone();
                DetectorInfo::try_from(record)
                    .map_err(|e| PoolError::InvalidSchema(format!("{}: {}", metric, e)))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            running: config.running,
            duration: config.duration,
            forecasting_seconds: config.forecasting_seconds,
            alarm_info: config.alarm_info.clone(),
            detector_info,
        })
    }

    /// Parse and validate a JSON entry.
    pub fn from_json(value: serde_json::Value) -> std::result::Result<Self, PoolError> {
        let config: PoolEntryConfig =
            serde_json::from_value(value).map_err(|e| PoolError::InvalidSchema(e.to_string()))?;
        Self::from_config(&config)
    }

    pub fn to_config(&self) -> PoolEntryConfig {
        PoolEntryConfig {
            running: self.running,
            duration: self.duration,
            forecasting_seconds: self.forecasting_seconds,
            alarm_info: self.alarm_info.clone(),
            detector_info: self
                .detector_info
                .iter()
                .cloned()
                .map(DetectorRecord::from)
                .collect(),
        }
    }

    pub fn main_metric(&self) -> &str {
        self.detector_info
            .first()
            .map(|d| d.metric_name.as_str())
            .unwrap_or_default()
    }
}

pub mod prelude {
    pub use crate::{
        Alarm, AlarmInfo, AlarmLevel, AlarmType, DetectorEntry, DetectorInfo, PoolEntryConfig,
        PoolError,
    };
}
