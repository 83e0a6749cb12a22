//! Metric-specific diagnosis attached to alarms.

use detector_spi::AnomalyMask;
use sequence_spi::Sequence;

/// Produces the `extra` text of an alarm from the series that raised it.
///
/// `series` holds the combination in chain order (main metric first);
/// `mask` is the merged anomaly mask over the main series.
pub trait Diagnoser: Send + Sync {
    fn diagnose(&self, series: &[Sequence], mask: &AnomalyMask) -> Option<String>;
}
