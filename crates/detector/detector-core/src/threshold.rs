//! Fixed-bound detector.

use detector_api::ThresholdConfig;
use detector_spi::{AnomalyMask, Detector, Result};
use sequence_spi::Sequence;

use crate::{pointwise, window_verdict};

/// Flags values outside `[low, high]`.
///
/// With a `percentage`, the verdict applies to the whole window: all points
/// are flagged when the breaching fraction reaches it, none otherwise.
#[derive(Debug, Clone)]
pub struct ThresholdDetector {
    high: Option<f64>,
    low: Option<f64>,
    percentage: Option<f64>,
    closed: bool,
}

impl ThresholdDetector {
    /// Create a detector; a missing bound is unbounded.
    pub fn new(high: Option<f64>, low: Option<f64>) -> Self {
        Self {
            high,
            low,
            percentage: None,
            closed: false,
        }
    }

    /// Create from configuration.
    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self {
            percentage: config.percentage,
            closed: config.closed,
            ..Self::new(config.high, config.low)
        }
    }

    pub fn high(&self) -> Option<f64> {
        self.high
    }

    pub fn low(&self) -> Option<f64> {
        self.low
    }

    /// True when `value` lies outside the bounds. Infinities breach the
    /// matching bound; NaN never does.
    pub fn breaches(&self, value: f64) -> bool {
        let above = self
            .high
            .map_or(false, |high| if self.closed { value >= high } else { value > high });
        let below = self
            .low
            .map_or(false, |low| if self.closed { value <= low } else { value < low });
        above || below
    }
}

impl Detector for ThresholdDetector {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn fit(&mut self, _train: &Sequence) -> Result<()> {
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let mask = pointwise(eval, |v| self.breaches(v));
        match self.percentage {
            Some(percentage) if !mask.is_empty() => {
                let fraction = mask.count() as f64 / mask.len() as f64;
                Ok(window_verdict(eval, fraction >= percentage))
            }
            _ => Ok(mask),
        }
    }
}
