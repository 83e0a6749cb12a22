//! In-memory time-series source
//!
//! Query evaluation over already-loaded series: metric name, window, exact
//! label filters and full-match regex label filters.

use regex::Regex;

use sequence_spi::{MetricQuery, Result, Sequence, SequenceError, SequenceSource};

/// Compile a `filter_like` pattern as a full match.
pub fn full_match_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| SequenceError::InvalidParameter {
        name: "filter_like".to_string(),
        reason: e.to_string(),
    })
}

/// True when `sequence` satisfies the name and label constraints of `query`.
pub fn query_matches(query: &MetricQuery, sequence: &Sequence) -> Result<bool> {
    if sequence.name() != query.metric_name {
        return Ok(false);
    }
    if !sequence.labels_match(&query.filter) {
        return Ok(false);
    }
    for (label, pattern) in &query.filter_like {
        let regex = full_match_regex(pattern)?;
        match sequence.labels().get(label) {
            Some(value) if regex.is_match(value) => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

/// Restrict a sequence to the points within `[start, end]`.
pub fn clip_to_window(sequence: &Sequence, start: i64, end: i64) -> Result<Sequence> {
    let (timestamps, values): (Vec<i64>, Vec<f64>) = sequence
        .timestamps()
        .iter()
        .zip(sequence.values())
        .filter(|(t, _)| **t >= start && **t <= end)
        .map(|(&t, &v)| (t, v))
        .unzip();
    Ok(Sequence::with_step(timestamps, values, sequence.step())?
        .named(sequence.name())
        .with_labels(sequence.labels().clone()))
}

/// `SequenceSource` backed by a vector of series.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    series: Vec<Sequence>,
}

impl MemorySource {
    pub fn new(series: Vec<Sequence>) -> Self {
        Self {
            name: "memory".to_string(),
            series,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn push(&mut self, sequence: Sequence) {
        self.series.push(sequence);
    }

    pub fn series(&self) -> &[Sequence] {
        &self.series
    }
}

impl SequenceSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, query: &MetricQuery) -> Result<Vec<Sequence>> {
        let mut result = Vec::new();
        for sequence in &self.series {
            if query_matches(query, sequence)? {
                result.push(clip_to_window(sequence, query.start, query.end)?);
            }
        }
        Ok(result)
    }
}
