//! Alarm types emitted by the generic detector.

use serde::{Deserialize, Serialize};

use sequence_spi::Labels;

/// Alarm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmType {
    #[default]
    System,
    Performance,
    Security,
    Log,
}

/// Alarm severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmLevel {
    Notset,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl AlarmLevel {
    /// Numeric severity on the conventional logging scale.
    pub fn severity(self) -> u8 {
        match self {
            AlarmLevel::Notset => 0,
            AlarmLevel::Info => 20,
            AlarmLevel::Warning => 30,
            AlarmLevel::Error => 40,
            AlarmLevel::Critical => 50,
        }
    }
}

/// Static description attached to every alarm a detector raises.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmInfo {
    pub content: String,
    #[serde(rename = "type")]
    pub alarm_type: AlarmType,
    pub level: AlarmLevel,
    /// Anomaly-kind tag, e.g. `memory_leak`
    pub cause: String,
    pub extra: Option<String>,
}

impl AlarmInfo {
    pub fn new(content: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            cause: cause.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, alarm_type: AlarmType) -> Self {
        self.alarm_type = alarm_type;
        self
    }

    pub fn with_level(mut self, level: AlarmLevel) -> Self {
        self.level = level;
        self
    }
}

/// A detected anomalous window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub instance: String,
    pub metric_name: String,
    /// Labels of the main series
    pub metric_filter: Labels,
    /// Milliseconds since epoch
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub alarm_type: AlarmType,
    pub alarm_level: AlarmLevel,
    pub alarm_cause: String,
    pub alarm_content: String,
    pub extra: Option<String>,
}

impl Alarm {
    /// Most severe first; equal levels by start timestamp.
    pub fn rank(alarms: &mut [Alarm]) {
        alarms.sort_by(|a, b| {
            b.alarm_level
                .cmp(&a.alarm_level)
                .then(a.start_timestamp.cmp(&b.start_timestamp))
        });
    }

    /// Window length in milliseconds.
    pub fn duration(&self) -> i64 {
        self.end_timestamp - self.start_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm(level: AlarmLevel, start: i64) -> Alarm {
        Alarm {
            instance: "10.0.0.1".to_string(),
            metric_name: "os_cpu_usage".to_string(),
            metric_filter: Labels::new(),
            start_timestamp: start,
            end_timestamp: start + 60_000,
            alarm_type: AlarmType::Performance,
            alarm_level: level,
            alarm_cause: "cpu_saturation".to_string(),
            alarm_content: "cpu saturated".to_string(),
            extra: None,
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(AlarmLevel::Critical > AlarmLevel::Error);
        assert!(AlarmLevel::Warning > AlarmLevel::Info);
        assert!(AlarmLevel::Info > AlarmLevel::Notset);
        assert_eq!(AlarmLevel::Error.severity(), 40);
    }

    #[test]
    fn test_rank() {
        let mut alarms = vec![
            alarm(AlarmLevel::Warning, 10),
            alarm(AlarmLevel::Critical, 30),
            alarm(AlarmLevel::Warning, 5),
            alarm(AlarmLevel::Critical, 20),
        ];
        Alarm::rank(&mut alarms);
        let order: Vec<(AlarmLevel, i64)> = alarms
            .iter()
            .map(|a| (a.alarm_level, a.start_timestamp))
            .collect();
        assert_eq!(
            order,
            vec![
                (AlarmLevel::Critical, 20),
                (AlarmLevel::Critical, 30),
                (AlarmLevel::Warning, 5),
                (AlarmLevel::Warning, 10),
            ]
        );
    }

    #[test]
    fn test_alarm_info_serde() {
        let info = AlarmInfo::new("disk will be full", "disk_will_be_full")
            .with_type(AlarmType::System)
            .with_level(AlarmLevel::Error);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "system");
        assert_eq!(json["level"], "error");
        assert_eq!(json["extra"], serde_json::Value::Null);

        let parsed: AlarmInfo = serde_json::from_str(r#"{"content": "x"}"#).unwrap();
        assert_eq!(parsed.level, AlarmLevel::Warning);
        assert_eq!(parsed.alarm_type, AlarmType::System);
    }

    #[test]
    fn test_duration() {
        assert_eq!(alarm(AlarmLevel::Info, 100).duration(), 60_000);
    }
}
