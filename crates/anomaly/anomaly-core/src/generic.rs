//! Generic multi-metric detector.
//!
//! A chain of detectors over a main metric and zero or more correlated
//! metrics on the same host. Every combination of matching series is
//! judged by AND-merging the per-metric masks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use anomaly_api::DetectorEntry;
use anomaly_spi::{Alarm, AnomalyError, Diagnoser, Result};
use detector_spi::{AnomalyMask, DetectorError};
use forecast_core::{forecast_sequence, ForecastContext, ForecastModel, ForecastRequest};
use sequence_core::source::full_match_regex;
use sequence_core::tidy_up;
use sequence_spi::{Labels, MetricQuery, Sequence, SequenceSource};

use crate::host::{HostPattern, HOST_LABELS};

/// Metrics whose masks may disagree in length.
///
/// When every metric of a chain is listed here, a mask that does not line
/// up with the merged mask is skipped instead of failing the combination.
pub const LENGTH_MISMATCH_EXEMPT: &[&str] = &[
    "os_disk_ioutils",
    "os_disk_iops",
    "os_network_receive_drop",
    "os_network_transmit_drop",
    "pg_replication_lag",
];

/// Detector chain turning matching series into alarms.
#[derive(Clone)]
pub struct GenericDetector {
    name: String,
    entry: DetectorEntry,
    fit_once: bool,
    models: Arc<Mutex<HashMap<String, ForecastModel>>>,
    diagnoser: Option<Arc<dyn Diagnoser>>,
}

impl fmt::Debug for GenericDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericDetector")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("fit_once", &self.fit_once)
            .field("diagnoser", &self.diagnoser.is_some())
            .finish()
    }
}

impl GenericDetector {
    pub fn new(name: impl Into<String>, entry: DetectorEntry) -> Result<Self> {
        let name = name.into();
        if entry.detector_info.is_empty() {
            return Err(AnomalyError::InvalidConfig {
                name,
                reason: "detector_info must not be empty".to_string(),
            });
        }
        for info in &entry.detector_info {
            for pattern in info.metric_filter_like.values() {
                full_match_regex(pattern).map_err(|e| AnomalyError::InvalidConfig {
                    name: format!("{}.{}", name, info.metric_name),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(Self {
            name,
            entry,
            fit_once: false,
            models: Arc::new(Mutex::new(HashMap::new())),
            diagnoser: None,
        })
    }

    /// Reuse the first forecasting model of each series on later calls.
    pub fn with_fit_once(mut self) -> Self {
        self.fit_once = true;
        self
    }

    pub fn with_diagnoser(mut self, diagnoser: Arc<dyn Diagnoser>) -> Self {
        self.diagnoser = Some(diagnoser);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &DetectorEntry {
        &self.entry
    }

    /// Number of forecasting models kept for reuse.
    pub fn recorded_models(&self) -> usize {
        self.models.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Run the chain over `[start, end]` (milliseconds).
    pub fn detect(
        &self,
        source: &dyn SequenceSource,
        ctx: &mut ForecastContext,
        start: i64,
        end: i64,
    ) -> Result<Vec<Alarm>> {
        let (main, _) = match self.entry.detector_info.split_first() {
            Some(split) => split,
            None => return Ok(Vec::new()),
        };
        let main_series = fetch_aligned(
            MetricQuery::new(main.metric_name.as_str(), start, end)
                .filters(&without_empty(&main.metric_filter))
                .filters_like(&main.metric_filter_like),
            source,
        )?;

        let mut alarms = Vec::new();
        for series in &main_series {
            let host = HostPattern::from_labels(series.labels());
            let candidates = match self.candidates(source, series, host.as_ref(), start, end) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(detector = %self.name, error = %e, "failed to resolve correlated series");
                    continue;
                }
            };
            for combination in cartesian(&candidates) {
                match self.evaluate(&combination, ctx) {
                    Ok(Some(mask)) => {
                        if let Some(alarm) = self.alarm(series, host.as_ref(), &combination, &mask) {
                            alarms.push(alarm);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(detector = %self.name, error = %e, "detection failed for a combination");
                    }
                }
            }
        }
        debug!(detector = %self.name, series = main_series.len(), alarms = alarms.len(), "detection finished");
        Ok(alarms)
    }

    /// Per-metric candidate lists, main series first.
    fn candidates(
        &self,
        source: &dyn SequenceSource,
        main: &Sequence,
        host: Option<&HostPattern>,
        start: i64,
        end: i64,
    ) -> Result<Vec<Vec<Sequence>>> {
        let mut lists = vec![vec![main.clone()]];
        for info in self.entry.detector_info.iter().skip(1) {
            let filter = substitute(&info.metric_filter, main.labels());
            let found = fetch_aligned(
                MetricQuery::new(info.metric_name.as_str(), start, end)
                    .filters(&filter)
                    .filters_like(&info.metric_filter_like),
                source,
            )?;
            let found: Vec<Sequence> = match host {
                Some(host) => found.into_iter().filter(|s| host.matches(s.labels())).collect(),
                None => found,
            };
            if found.is_empty() {
                debug!(detector = %self.name, metric = %info.metric_name, "no correlated series");
            }
            lists.push(found);
        }
        Ok(lists)
    }

    /// AND-merged mask of one combination, `None` when nothing is flagged.
    fn evaluate(
        &self,
        combination: &[&Sequence],
        ctx: &mut ForecastContext,
    ) -> Result<Option<AnomalyMask>> {
        let exempt = self
            .entry
            .detector_info
            .iter()
            .all(|info| LENGTH_MISMATCH_EXEMPT.contains(&info.metric_name.as_str()));

        let mut merged: Option<AnomalyMask> = None;
        for (info, series) in self.entry.detector_info.iter().zip(combination) {
            let series = self.augment(series, ctx)?;
            let mut detector = detector_core::build(&info.detector)?;
            let mask = detector.fit_predict(&series)?;
            merged = Some(match merged {
                None => mask,
                Some(acc) => match acc.and(&mask) {
                    Ok(next) => next,
                    Err(DetectorError::LengthMismatch { left, right }) if exempt => {
                        debug!(metric = %info.metric_name, left, right, "skipping mismatched mask");
                        acc
                    }
                    Err(e) => return Err(e.into()),
                },
            });
        }
        Ok(merged.filter(AnomalyMask::any))
    }

    /// Append the forecast of `series` when forecasting is enabled.
    fn augment(&self, series: &Sequence, ctx: &mut ForecastContext) -> Result<Sequence> {
        let seconds = match self.entry.forecasting_seconds {
            Some(seconds) => seconds,
            None => return Ok(series.clone()),
        };
        let key = series_key(series);
        let mut request = ForecastRequest::new(seconds as f64);
        if self.fit_once {
            if let Some(model) = self.models.lock().ok().and_then(|m| m.get(&key).cloned()) {
                request = request.with_model(model);
            }
        }

        let outcome = forecast_sequence(ctx, series, request)?;
        if self.fit_once {
            if let (Some(model), Ok(mut models)) = (outcome.model, self.models.lock()) {
                models.entry(key).or_insert_with(|| model.fit_once());
            }
        }
        match outcome.sequence {
            Some(forecast) if !forecast.is_empty() => Ok(series.concat(&forecast)?),
            _ => Ok(series.clone()),
        }
    }

    fn alarm(
        &self,
        main: &Sequence,
        host: Option<&HostPattern>,
        combination: &[&Sequence],
        mask: &AnomalyMask,
    ) -> Option<Alarm> {
        let start = *mask.timestamps.get(mask.first_true()?)?;
        let end = *mask.timestamps.get(mask.last_true()?)?;
        let info = &self.entry.alarm_info;
        let extra = match &self.diagnoser {
            Some(diagnoser) => {
                let series: Vec<Sequence> = combination.iter().map(|s| (*s).clone()).collect();
                diagnoser.diagnose(&series, mask)
            }
            None => None,
        }
        .or_else(|| info.extra.clone());

        Some(Alarm {
            instance: instance_of(main, host),
            metric_name: main.name().to_string(),
            metric_filter: main.labels().clone(),
            start_timestamp: start,
            end_timestamp: end,
            alarm_type: info.alarm_type,
            alarm_level: info.level,
            alarm_cause: info.cause.clone(),
            alarm_content: info.content.clone(),
            extra,
        })
    }
}

/// Run `query` and align every returned series to its nominal step.
fn fetch_aligned(query: MetricQuery, source: &dyn SequenceSource) -> Result<Vec<Sequence>> {
    let mut series = Vec::new();
    for sequence in query.fetchall(source)? {
        series.push(tidy_up(&sequence)?);
    }
    Ok(series)
}

fn without_empty(filter: &Labels) -> Labels {
    filter
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Fill empty filter values from the main labels; a label the main series
/// lacks drops the constraint.
fn substitute(filter: &Labels, main: &Labels) -> Labels {
    filter
        .iter()
        .filter_map(|(key, value)| {
            if value.is_empty() {
                main.get(key).map(|v| (key.clone(), v.clone()))
            } else {
                Some((key.clone(), value.clone()))
            }
        })
        .collect()
}

fn instance_of(main: &Sequence, host: Option<&HostPattern>) -> String {
    match host {
        Some(host) => host.host().to_string(),
        None => HOST_LABELS
            .iter()
            .find_map(|key| main.labels().get(*key))
            .cloned()
            .unwrap_or_default(),
    }
}

fn series_key(series: &Sequence) -> String {
    let labels: Vec<String> = series
        .labels()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!("{}{{{}}}", series.name(), labels.join(","))
}

/// Every pick of one element per list.
fn cartesian<T>(lists: &[Vec<T>]) -> Vec<Vec<&T>> {
    if lists.is_empty() || lists.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    let mut indices = vec![0usize; lists.len()];
    let mut result = Vec::new();
    loop {
        result.push(indices.iter().zip(lists).map(|(&i, list)| &list[i]).collect());
        let mut pos = lists.len();
        loop {
            if pos == 0 {
                return result;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < lists[pos].len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}
