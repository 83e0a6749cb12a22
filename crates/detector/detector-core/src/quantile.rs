//! Quantile and interquartile-range detectors.

use detector_api::{IqrConfig, Outliers, QuantileConfig};
use detector_spi::{AnomalyMask, Detector, DetectorError, Result};
use sequence_core::stats;
use sequence_spi::Sequence;

use crate::pointwise;

/// Flags values above the `high` or below the `low` training quantile.
#[derive(Debug, Clone)]
pub struct QuantileDetector {
    high: f64,
    low: f64,
    bounds: Option<(f64, f64)>,
}

impl QuantileDetector {
    pub fn new(high: f64, low: f64) -> Self {
        Self {
            high,
            low,
            bounds: None,
        }
    }

    pub fn from_config(config: &QuantileConfig) -> Self {
        Self::new(config.high, config.low)
    }

    /// Fitted `(low, high)` quantile values.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }
}

impl Detector for QuantileDetector {
    fn name(&self) -> &'static str {
        "quantile"
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        let values = train.values();
        let (Some(low), Some(high)) = (stats::quantile(values, self.low), stats::quantile(values, self.high)) else {
            return Err(DetectorError::InsufficientData {
                required: 1,
                actual: 0,
            });
        };
        self.bounds = Some((low, high));
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let (low, high) = self.bounds.ok_or(DetectorError::NotFitted)?;
        Ok(pointwise(eval, |v| v > high || v < low))
    }
}

/// Outlier bounds derived from the quartiles of a distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// `q1 - lo * iqr` and `q3 + hi * iqr`; a `None` factor leaves that side open.
    pub fn fit(values: &[f64], outliers: &Outliers) -> Result<Self> {
        let (Some(q1), Some(q3)) = (stats::quantile(values, 0.25), stats::quantile(values, 0.75)) else {
            return Err(DetectorError::InsufficientData {
                required: 1,
                actual: 0,
            });
        };
        let iqr = q3 - q1;
        Ok(Self {
            lower: outliers.0.map_or(f64::NEG_INFINITY, |f| q1 - f * iqr),
            upper: outliers.1.map_or(f64::INFINITY, |f| q3 + f * iqr),
        })
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Interquartile range detector on raw values.
#[derive(Debug, Clone)]
pub struct IqrDetector {
    outliers: Outliers,
    bounds: Option<IqrBounds>,
}

impl IqrDetector {
    pub fn new(outliers: Outliers) -> Self {
        Self {
            outliers,
            bounds: None,
        }
    }

    pub fn from_config(config: &IqrConfig) -> Self {
        Self::new(config.outliers)
    }

    pub fn bounds(&self) -> Option<IqrBounds> {
        self.bounds
    }
}

impl Default for IqrDetector {
    fn default() -> Self {
        Self::from_config(&IqrConfig::default())
    }
}

impl Detector for IqrDetector {
    fn name(&self) -> &'static str {
        "inter_quartile_range"
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        self.bounds = Some(IqrBounds::fit(train.values(), &self.outliers)?);
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let bounds = self.bounds.ok_or(DetectorError::NotFitted)?;
        Ok(pointwise(eval, |v| bounds.is_outlier(v)))
    }
}
