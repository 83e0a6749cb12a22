//! Alarm reporters.

use std::sync::Mutex;

use tracing::{error, info, warn};

use anomaly_spi::{Alarm, AlarmLevel, AlarmReporter, AnomalyError, Result};

/// Writes every alarm to the log at a level matching its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl AlarmReporter for TracingReporter {
    fn report(&self, alarms: &[Alarm]) -> Result<()> {
        for alarm in alarms {
            match alarm.alarm_level {
                AlarmLevel::Critical | AlarmLevel::Error => error!(
                    instance = %alarm.instance,
                    metric = %alarm.metric_name,
                    cause = %alarm.alarm_cause,
                    start = alarm.start_timestamp,
                    end = alarm.end_timestamp,
                    extra = alarm.extra.as_deref().unwrap_or(""),
                    "{}", alarm.alarm_content
                ),
                AlarmLevel::Warning => warn!(
                    instance = %alarm.instance,
                    metric = %alarm.metric_name,
                    cause = %alarm.alarm_cause,
                    start = alarm.start_timestamp,
                    end = alarm.end_timestamp,
                    "{}", alarm.alarm_content
                ),
                AlarmLevel::Info | AlarmLevel::Notset => info!(
                    instance = %alarm.instance,
                    metric = %alarm.metric_name,
                    cause = %alarm.alarm_cause,
                    "{}", alarm.alarm_content
                ),
            }
        }
        Ok(())
    }
}

/// Keeps reported alarms in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    alarms: Mutex<Vec<Alarm>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the alarms reported so far.
    pub fn drain(&self) -> Vec<Alarm> {
        self.alarms
            .lock()
            .map(|mut alarms| std::mem::take(&mut *alarms))
            .unwrap_or_default()
    }
}

impl AlarmReporter for CollectingReporter {
    fn report(&self, alarms: &[Alarm]) -> Result<()> {
        self.alarms
            .lock()
            .map_err(|_| AnomalyError::Report("reporter lock poisoned".to_string()))?
            .extend_from_slice(alarms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequence_spi::Labels;

    fn alarm(level: AlarmLevel) -> Alarm {
        Alarm {
            instance: "h".to_string(),
            metric_name: "m".to_string(),
            metric_filter: Labels::new(),
            start_timestamp: 0,
            end_timestamp: 1,
            alarm_type: Default::default(),
            alarm_level: level,
            alarm_cause: "c".to_string(),
            alarm_content: "content".to_string(),
            extra: None,
        }
    }

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::new();
        reporter.report(&[alarm(AlarmLevel::Error)]).unwrap();
        reporter.report(&[alarm(AlarmLevel::Info)]).unwrap();
        assert_eq!(reporter.drain().len(), 2);
        assert!(reporter.drain().is_empty());
    }

    #[test]
    fn test_tracing_reporter_accepts_every_level() {
        let alarms: Vec<Alarm> = [
            AlarmLevel::Critical,
            AlarmLevel::Warning,
            AlarmLevel::Notset,
        ]
        .into_iter()
        .map(alarm)
        .collect();
        assert!(TracingReporter.report(&alarms).is_ok());
    }
}
