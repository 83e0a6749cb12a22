//! Time series model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};

/// Label mapping identifying the source of a series.
pub type Labels = BTreeMap<String, String>;

/// Ordered `(timestamp, value)` samples with one nominal sampling interval.
///
/// Timestamps are milliseconds since the epoch and strictly increasing.
/// Missing samples are represented by `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSequence")]
pub struct Sequence {
    timestamps: Vec<i64>,
    values: Vec<f64>,
    step: i64,
    name: String,
    labels: Labels,
}

impl Sequence {
    /// Create a sequence, inferring the step from the timestamps.
    pub fn new(timestamps: Vec<i64>, values: Vec<f64>) -> Result<Self> {
        let step = infer_step(&timestamps);
        Self::with_step(timestamps, values, step)
    }

    /// Create a sequence with an explicit nominal step.
    pub fn with_step(timestamps: Vec<i64>, values: Vec<f64>, step: i64) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(SequenceError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SequenceError::NotIncreasing { index: index + 1 });
        }
        if step < 0 {
            return Err(SequenceError::InvalidParameter {
                name: "step".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        Ok(Self {
            timestamps,
            values,
            step,
            name: String::new(),
            labels: Labels::new(),
        })
    }

    /// Build a regularly sampled sequence starting at `start`.
    pub fn from_values(start: i64, step: i64, values: Vec<f64>) -> Self {
        let step = step.max(1);
        let timestamps = (0..values.len() as i64).map(|i| start + i * step).collect();
        Self {
            timestamps,
            values,
            step,
            name: String::new(),
            labels: Labels::new(),
        }
    }

    /// An empty sequence carrying only a name.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            timestamps: Vec::new(),
            values: Vec::new(),
            step: 0,
            name: name.into(),
            labels: Labels::new(),
        }
    }

    /// Set the metric name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the label mapping.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Add a single label.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Nominal sampling interval in milliseconds.
    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }

    /// Time covered by the series, in milliseconds.
    pub fn span(&self) -> i64 {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    /// True when no value is missing.
    pub fn is_fully_defined(&self) -> bool {
        self.values.iter().all(|v| !v.is_nan())
    }

    /// Same timestamps, name and labels with new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.timestamps.len() {
            return Err(SequenceError::LengthMismatch {
                timestamps: self.timestamps.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            timestamps: self.timestamps.clone(),
            values,
            step: self.step,
            name: self.name.clone(),
            labels: self.labels.clone(),
        })
    }

    /// Append `values` as future points spaced by `step` after the last timestamp.
    pub fn extend_forecast(&self, values: &[f64]) -> Self {
        let step = self.step.max(1);
        let last = self.last_timestamp().unwrap_or(0);
        let mut result = self.clone();
        for (i, &value) in values.iter().enumerate() {
            result.timestamps.push(last + step * (i as i64 + 1));
            result.values.push(value);
        }
        result
    }

    /// Append a later sequence. Fails if `other` does not start after `self` ends.
    pub fn concat(&self, other: &Sequence) -> Result<Self> {
        if let (Some(last), Some(first)) = (self.last_timestamp(), other.first_timestamp()) {
            if first <= last {
                return Err(SequenceError::NotIncreasing { index: self.len() });
            }
        }
        let mut result = self.clone();
        result.timestamps.extend_from_slice(&other.timestamps);
        result.values.extend_from_slice(&other.values);
        if result.step == 0 {
            result.step = other.step;
        }
        Ok(result)
    }

    /// True when every `(key, value)` of `filter` is present in the labels.
    pub fn labels_match(&self, filter: &Labels) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.labels.get(key) == Some(value))
    }
}

/// Wire form of [`Sequence`], validated on the way in.
#[derive(Deserialize)]
struct RawSequence {
    timestamps: Vec<i64>,
    values: Vec<f64>,
    step: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    labels: Labels,
}

impl TryFrom<RawSequence> for Sequence {
    type Error = SequenceError;

    fn try_from(raw: RawSequence) -> Result<Self> {
        Ok(Sequence::with_step(raw.timestamps, raw.values, raw.step)?
            .named(raw.name)
            .with_labels(raw.labels))
    }
}

/// Most frequent positive gap between consecutive timestamps; ties pick the smaller gap.
fn infer_step(timestamps: &[i64]) -> i64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for w in timestamps.windows(2) {
        let gap = w[1] - w[0];
        if gap > 0 {
            *counts.entry(gap).or_insert(0) += 1;
        }
    }
    let mut best = (0, 0usize);
    for (gap, count) in counts {
        if count > best.1 {
            best = (gap, count);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_infers_step() {
        let seq = Sequence::new(vec![0, 1000, 2000, 3500, 4500], vec![1.0; 5]).unwrap();
        assert_eq!(seq.step(), 1000);
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = Sequence::new(vec![0, 1], vec![1.0]).unwrap_err();
        assert!(matches!(err, SequenceError::LengthMismatch { .. }));
    }

    #[test]
    fn test_rejects_non_increasing() {
        let err = Sequence::new(vec![0, 2, 2], vec![1.0; 3]).unwrap_err();
        assert_eq!(err, SequenceError::NotIncreasing { index: 2 });
    }

    #[test]
    fn test_from_values_regular_grid() {
        let seq = Sequence::from_values(100, 10, vec![1.0, 2.0, 3.0]);
        assert_eq!(seq.timestamps(), &[100, 110, 120]);
        assert_eq!(seq.span(), 20);
    }

    #[test]
    fn test_extend_forecast() {
        let seq = Sequence::from_values(0, 5, vec![1.0, 2.0]);
        let extended = seq.extend_forecast(&[3.0, 4.0]);
        assert_eq!(extended.timestamps(), &[0, 5, 10, 15]);
        assert_eq!(extended.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_concat_requires_ordering() {
        let a = Sequence::from_values(0, 1, vec![1.0, 2.0]);
        let b = Sequence::from_values(1, 1, vec![3.0]);
        assert!(a.concat(&b).is_err());

        let c = Sequence::from_values(2, 1, vec![3.0]);
        assert_eq!(a.concat(&c).unwrap().len(), 3);
    }

    #[test]
    fn test_labels_match() {
        let seq = Sequence::from_values(0, 1, vec![1.0])
            .label("instance", "10.0.0.1:9100")
            .label("datname", "postgres");
        let mut filter = Labels::new();
        filter.insert("datname".to_string(), "postgres".to_string());
        assert!(seq.labels_match(&filter));
        filter.insert("datname".to_string(), "other".to_string());
        assert!(!seq.labels_match(&filter));
    }

    #[test]
    fn test_is_fully_defined() {
        let seq = Sequence::from_values(0, 1, vec![1.0, f64::NAN]);
        assert!(!seq.is_fully_defined());
    }

    #[test]
    fn test_serde_roundtrip_keeps_labels() {
        let seq = Sequence::from_values(0, 1, vec![1.0, 2.0])
            .named("os_cpu_usage")
            .label("instance", "db1");
        let json = serde_json::to_string(&seq).unwrap();
        let back: Sequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "os_cpu_usage");
        assert_eq!(back.labels().get("instance").map(String::as_str), Some("db1"));
    }

    #[test]
    fn test_deserialize_validates() {
        let unordered = r#"{"timestamps": [0, 2000, 1000], "values": [1.0, 2.0, 3.0], "step": 1000}"#;
        assert!(serde_json::from_str::<Sequence>(unordered)
            .unwrap_err()
            .to_string()
            .contains("index 2"));

        let short = r#"{"timestamps": [0, 1000], "values": [1.0], "step": 1000}"#;
        assert!(serde_json::from_str::<Sequence>(short).is_err());

        let negative = r#"{"timestamps": [0], "values": [1.0], "step": -5}"#;
        assert!(serde_json::from_str::<Sequence>(negative).is_err());

        let bare = r#"{"timestamps": [0, 1000], "values": [1.0, 2.0], "step": 1000}"#;
        let seq: Sequence = serde_json::from_str(bare).unwrap();
        assert_eq!(seq.name(), "");
        assert!(seq.labels().is_empty());
    }
}
