//! Built-in per-metric rules
//!
//! Hand-authored detector chains for common host problems. Thresholds are
//! resolved through a [`ParamSource`] at registration time.

use std::fmt;
use std::sync::Arc;

use anomaly_api::{AlarmInfo, AlarmLevel, AlarmType, DetectorEntry, DetectorInfo};
use anomaly_spi::{Diagnoser, PoolError};
use detector_api::{
    AnyOfConfig, DetectorConfig, ForecastConfig, IncreaseConfig, LevelShiftConfig, SpikeConfig,
    ThresholdConfig,
};
use detector_spi::AnomalyMask;
use sequence_core::stats::{self, linear_fit};
use sequence_spi::{ParamSource, Sequence};

use crate::pool::DetectorPool;

const HOUR_MS: f64 = 3_600_000.0;

/// A named rule over one metric.
pub struct Rule {
    pub name: &'static str,
    pub metric: &'static str,
    entry: fn(&dyn ParamSource) -> DetectorEntry,
    diagnoser: fn(&dyn ParamSource) -> Arc<dyn Diagnoser>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("metric", &self.metric)
            .finish()
    }
}

impl Rule {
    pub fn entry(&self, params: &dyn ParamSource) -> DetectorEntry {
        (self.entry)(params)
    }

    pub fn diagnoser(&self, params: &dyn ParamSource) -> Arc<dyn Diagnoser> {
        (self.diagnoser)(params)
    }
}

const BUILTIN: &[Rule] = &[
    Rule {
        name: "disk_will_be_full",
        metric: "os_disk_usage",
        entry: disk_will_be_full,
        diagnoser: disk_fill_diagnoser,
    },
    Rule {
        name: "memory_leak",
        metric: "os_mem_usage",
        entry: memory_leak,
        diagnoser: memory_growth_diagnoser,
    },
    Rule {
        name: "cpu_saturation",
        metric: "os_cpu_usage",
        entry: cpu_saturation,
        diagnoser: cpu_busy_diagnoser,
    },
];

/// Static table of built-in rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleRegistry {
    rules: &'static [Rule],
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleRegistry {
    pub fn builtin() -> Self {
        Self { rules: BUILTIN }
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    pub fn get(&self, name: &str) -> Option<&'static Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }
}

fn seconds(params: &dyn ParamSource, name: &str, default: f64) -> u64 {
    params.param_or(name, default).max(1.0) as u64
}

fn disk_will_be_full(params: &dyn ParamSource) -> DetectorEntry {
    let detector = DetectorConfig::Forecast(ForecastConfig {
        horizon_seconds: params.param_or("disk_forecast_seconds", 6.0 * 3600.0),
        high: Some(params.threshold_or("disk_usage_threshold", 0.9)),
        ..ForecastConfig::default()
    });
    DetectorEntry::new(
        seconds(params, "disk_usage_duration", 24.0 * 3600.0),
        AlarmInfo::new("disk usage is forecast to exceed its threshold", "disk_will_be_full")
            .with_type(AlarmType::System)
            .with_level(AlarmLevel::Critical),
        vec![DetectorInfo::new("os_disk_usage", detector)],
    )
}

fn memory_leak(params: &dyn ParamSource) -> DetectorEntry {
    let detector = DetectorConfig::AnyOf(AnyOfConfig {
        detectors: vec![
            DetectorConfig::Threshold(ThresholdConfig::new(
                Some(params.threshold_or("mem_usage_threshold", 0.9)),
                None,
            )),
            DetectorConfig::Spike(SpikeConfig::default()),
            DetectorConfig::LevelShift(LevelShiftConfig::default()),
            DetectorConfig::Increase(IncreaseConfig {
                alpha: params.param_or("memory_leak_alpha", 0.05),
                ..IncreaseConfig::default()
            }),
        ],
        minimum_length: 0,
    });
    DetectorEntry::new(
        seconds(params, "mem_usage_duration", 3600.0),
        AlarmInfo::new("memory usage keeps growing", "memory_leak")
            .with_type(AlarmType::System)
            .with_level(AlarmLevel::Error),
        vec![DetectorInfo::new("os_mem_usage", detector)],
    )
}

fn cpu_saturation(params: &dyn ParamSource) -> DetectorEntry {
    let detector = DetectorConfig::AnyOf(AnyOfConfig {
        detectors: vec![
            DetectorConfig::Threshold(
                ThresholdConfig::new(Some(params.threshold_or("cpu_usage_threshold", 0.9)), None)
                    .with_percentage(params.param_or("cpu_high_usage_percent", 0.8)),
            ),
            DetectorConfig::LevelShift(LevelShiftConfig::default()),
        ],
        minimum_length: 0,
    });
    DetectorEntry::new(
        seconds(params, "cpu_usage_duration", 600.0),
        AlarmInfo::new("cpu is saturated", "cpu_saturation")
            .with_type(AlarmType::Performance)
            .with_level(AlarmLevel::Warning),
        vec![DetectorInfo::new("os_cpu_usage", detector)],
    )
}

/// Hours elapsed since the first timestamp, paired with the finite values.
fn hourly_points(series: &Sequence) -> (Vec<f64>, Vec<f64>) {
    let start = series.first_timestamp().unwrap_or(0);
    series
        .timestamps()
        .iter()
        .zip(series.values())
        .filter(|(_, v)| v.is_finite())
        .map(|(&t, &v)| ((t - start) as f64 / HOUR_MS, v))
        .unzip()
}

fn percent(value: f64) -> f64 {
    value * 100.0
}

struct DiskFill {
    threshold: f64,
}

impl Diagnoser for DiskFill {
    fn diagnose(&self, series: &[Sequence], _mask: &AnomalyMask) -> Option<String> {
        let (hours, values) = hourly_points(series.first()?);
        let current = *values.last()?;
        let fit = linear_fit(&hours, &values)?;
        if fit.slope <= 0.0 {
            return Some(format!("disk usage {:.1}% is not growing", percent(current)));
        }
        let remaining = ((self.threshold - current) / fit.slope).max(0.0);
        Some(format!(
            "disk usage {:.1}% grows {:.2}% per hour, {:.1}% reached in about {:.1} hours",
            percent(current),
            percent(fit.slope),
            percent(self.threshold),
            remaining
        ))
    }
}

struct MemoryGrowth;

impl Diagnoser for MemoryGrowth {
    fn diagnose(&self, series: &[Sequence], mask: &AnomalyMask) -> Option<String> {
        let values = series.first()?.values();
        let first = mask.first_true()?;
        let last = mask.last_true()?;
        let before = stats::mean(&values[..first.max(1).min(values.len())]);
        let during = stats::mean(values.get(first..=last)?);
        if !before.is_finite() || !during.is_finite() {
            return None;
        }
        Some(format!(
            "memory usage moved from {:.1}% to {:.1}% over {} flagged points",
            percent(before),
            percent(during),
            mask.count()
        ))
    }
}

struct CpuBusy {
    threshold: f64,
}

impl Diagnoser for CpuBusy {
    fn diagnose(&self, series: &[Sequence], _mask: &AnomalyMask) -> Option<String> {
        let values = stats::finite(series.first()?.values());
        if values.is_empty() {
            return None;
        }
        let busy = values.iter().filter(|&&v| v > self.threshold).count();
        Some(format!(
            "cpu usage above {:.0}% for {:.0}% of the window",
            percent(self.threshold),
            100.0 * busy as f64 / values.len() as f64
        ))
    }
}

fn disk_fill_diagnoser(params: &dyn ParamSource) -> Arc<dyn Diagnoser> {
    Arc::new(DiskFill {
        threshold: params.threshold_or("disk_usage_threshold", 0.9),
    })
}

fn memory_growth_diagnoser(_params: &dyn ParamSource) -> Arc<dyn Diagnoser> {
    Arc::new(MemoryGrowth)
}

fn cpu_busy_diagnoser(params: &dyn ParamSource) -> Arc<dyn Diagnoser> {
    Arc::new(CpuBusy {
        threshold: params.threshold_or("cpu_usage_threshold", 0.9),
    })
}

/// Register the built-in rules missing from `pool` and attach their
/// diagnosers. Returns the number of rules added.
pub fn register_builtin_rules(
    pool: &DetectorPool,
    params: &dyn ParamSource,
) -> Result<usize, PoolError> {
    let registry = RuleRegistry::builtin();
    let mut added = 0;
    for rule in registry.rules() {
        pool.register_diagnoser(rule.metric, rule.diagnoser(params))?;
        if pool.contains(rule.name) {
            continue;
        }
        pool.add(rule.name, rule.entry(params).to_config())?;
        added += 1;
    }
    tracing::info!(added, "registered built-in rules");
    Ok(added)
}
