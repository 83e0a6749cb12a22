//! In-memory catalog of long-horizon series.

use std::collections::BTreeMap;

use sequence_core::source::{clip_to_window, query_matches};
use sequence_spi::{MetricQuery, Result, Sequence, SequenceSource};

/// Minimum span a series must cover to stay in the catalog (one week, ms).
pub const MIN_SPAN_MS: i64 = 7 * 24 * 3600 * 1000;
/// Maximum age of the newest point of a kept series (one hour, ms).
pub const MAX_STALENESS_MS: i64 = 3600 * 1000;

/// Series accumulated across detection rounds, keyed by name and labels.
#[derive(Debug, Clone, Default)]
pub struct SequenceCatalog {
    series: BTreeMap<String, Sequence>,
}

impl SequenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Merge `sequence` into the catalog; only points newer than the stored
    /// series are appended.
    pub fn update(&mut self, sequence: Sequence) -> Result<()> {
        let key = catalog_key(&sequence);
        let merged = match self.series.get(&key) {
            Some(existing) => match existing.last_timestamp() {
                Some(last) => {
                    let newer = clip_to_window(&sequence, last + 1, i64::MAX)?;
                    existing.concat(&newer)?
                }
                None => sequence,
            },
            None => sequence,
        };
        self.series.insert(key, merged);
        Ok(())
    }

    /// Drop series spanning less than a week or not updated within the hour.
    ///
    /// Returns the number of series removed.
    pub fn prune(&mut self, now: i64) -> usize {
        let before = self.series.len();
        self.series.retain(|_, s| {
            let fresh = s
                .last_timestamp()
                .map_or(false, |last| now - last <= MAX_STALENESS_MS);
            fresh && s.span() >= MIN_SPAN_MS
        });
        let removed = before - self.series.len();
        if removed > 0 {
            tracing::debug!(removed, kept = self.series.len(), "pruned sequence catalog");
        }
        removed
    }
}

fn catalog_key(sequence: &Sequence) -> String {
    let labels: Vec<String> = sequence
        .labels()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!("{}{{{}}}", sequence.name(), labels.join(","))
}

impl SequenceSource for SequenceCatalog {
    fn name(&self) -> &str {
        "catalog"
    }

    fn query(&self, query: &MetricQuery) -> Result<Vec<Sequence>> {
        let mut result = Vec::new();
        for sequence in self.series.values() {
            if query_matches(query, sequence)? {
                result.push(clip_to_window(sequence, query.start, query.end)?);
            }
        }
        Ok(result)
    }
}
