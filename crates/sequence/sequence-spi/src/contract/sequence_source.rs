//! Time-series source contract.

use crate::error::Result;
use crate::model::{Labels, Sequence};

/// Trait for the storage/query layer that resolves metric queries to series.
///
/// Implementations return every series matching the query. Empty series are
/// allowed in the answer; `MetricQuery::fetchall` and `MetricQuery::fetchone`
/// drop them so callers can tell "no data" apart from "zero-valued data".
pub trait SequenceSource: Send + Sync {
    /// Data source name.
    fn name(&self) -> &str;

    /// Answer a query.
    fn query(&self, query: &MetricQuery) -> Result<Vec<Sequence>>;
}

/// A chainable query for one metric over a time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub metric_name: String,
    /// Inclusive window start, milliseconds.
    pub start: i64,
    /// Inclusive window end, milliseconds.
    pub end: i64,
    pub step: Option<i64>,
    /// Exact label matches.
    pub filter: Labels,
    /// Label regular expressions (full match).
    pub filter_like: Labels,
}

impl MetricQuery {
    /// Create a query over `[start, end]`.
    pub fn new(metric_name: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            metric_name: metric_name.into(),
            start,
            end,
            step: None,
            filter: Labels::new(),
            filter_like: Labels::new(),
        }
    }

    /// Request a sampling step.
    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Require `label == value`.
    pub fn filter(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter.insert(label.into(), value.into());
        self
    }

    /// Require `label` to fully match the regular expression `pattern`.
    pub fn filter_like(mut self, label: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filter_like.insert(label.into(), pattern.into());
        self
    }

    /// Add several exact filters at once.
    pub fn filters(mut self, filters: &Labels) -> Self {
        for (label, value) in filters {
            self.filter.insert(label.clone(), value.clone());
        }
        self
    }

    /// Add several regex filters at once.
    pub fn filters_like(mut self, filters: &Labels) -> Self {
        for (label, pattern) in filters {
            self.filter_like.insert(label.clone(), pattern.clone());
        }
        self
    }

    /// First non-empty matching series, if any.
    pub fn fetchone(&self, source: &dyn SequenceSource) -> Result<Option<Sequence>> {
        Ok(source.query(self)?.into_iter().find(|s| !s.is_empty()))
    }

    /// Every non-empty matching series.
    pub fn fetchall(&self, source: &dyn SequenceSource) -> Result<Vec<Sequence>> {
        Ok(source
            .query(self)?
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect())
    }
}
