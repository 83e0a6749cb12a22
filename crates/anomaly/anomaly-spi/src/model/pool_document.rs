//! Persisted detector-pool document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sequence_spi::Labels;

use super::alarm::AlarmInfo;

/// Pool entries keyed by detector name.
pub type PoolDocument = BTreeMap<String, PoolEntryConfig>;

/// One link of a detector chain as stored on disk.
///
/// `detector_kind`/`detector_kwargs` are kept untyped here and validated
/// when the entry is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorRecord {
    pub metric_name: String,
    #[serde(default)]
    pub metric_filter: Labels,
    #[serde(default)]
    pub metric_filter_like: Labels,
    pub detector_kind: String,
    #[serde(default)]
    pub detector_kwargs: Value,
}

/// A named detector's persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolEntryConfig {
    #[serde(default = "default_running")]
    pub running: bool,
    /// Detection window, seconds
    pub duration: u64,
    /// Forecast horizon appended to every series, seconds
    #[serde(default)]
    pub forecasting_seconds: Option<u64>,
    #[serde(default)]
    pub alarm_info: AlarmInfo,
    pub detector_info: Vec<DetectorRecord>,
}

fn default_running() -> bool {
    true
}

impl PoolEntryConfig {
    pub fn new(duration: u64, alarm_info: AlarmInfo, detector_info: Vec<DetectorRecord>) -> Self {
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

    /// Name of the main (first) metric.
    pub fn main_metric(&self) -> Option<&str> {
        self.detector_info.first().map(|d| d.metric_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "d1": {
                "running": false,
                "duration": 600,
                "forecasting_seconds": 3600,
                "alarm_info": {"content": "high cpu", "type": "performance", "level": "critical", "cause": "cpu", "extra": null},
                "detector_info": [
                    {"metric_name": "os_cpu_usage", "metric_filter": {"instance": "10.0.0.1"},
                     "metric_filter_like": {}, "detector_kind": "threshold", "detector_kwargs": {"high": 0.9}}
                ]
            }
        }"#;
        let doc: PoolDocument = serde_json::from_str(json).unwrap();
        let entry = &doc["d1"];
        assert!(!entry.running);
        assert_eq!(entry.forecasting_seconds, Some(3600));
        assert_eq!(entry.main_metric(), Some("os_cpu_usage"));
        assert_eq!(entry.detector_info[0].detector_kwargs["high"], 0.9);
    }

    #[test]
    fn test_defaults() {
        let json = r#"{"duration": 60, "detector_info": [{"metric_name": "m", "detector_kind": "threshold"}]}"#;
        let entry: PoolEntryConfig = serde_json::from_str(json).unwrap();
        assert!(entry.running);
        assert!(entry.forecasting_seconds.is_none());
        assert!(entry.detector_info[0].metric_filter.is_empty());
        assert!(entry.detector_info[0].detector_kwargs.is_null());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"duration": 60, "detector_info": [], "interval": 5}"#;
        assert!(serde_json::from_str::<PoolEntryConfig>(json).is_err());
    }
}
