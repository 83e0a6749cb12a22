//! Detector Configuration API
//!
//! Configuration types for every detector kind. A configuration is a closed
//! tagged enum, persisted as `{"detector_kind": ..., "detector_kwargs": {...}}`
//! and validated before any detector is built from it.

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use detector_spi::{AnomalyMask, Detector, DetectorError, Result};
pub use sequence_core::{Agg, SeasonalityConfig};

/// Lower and upper IQR factors. `None` leaves that side unbounded.
pub type Outliers = (Option<f64>, Option<f64>);

// ============================================================================
// Shared parameters
// ============================================================================

/// Direction of a change that counts as anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Positive,
    Negative,
    #[default]
    Both,
}

impl Side {
    /// True when a signed change points in this direction.
    pub fn matches(&self, signed: f64) -> bool {
        match self {
            Side::Positive => signed > 0.0,
            Side::Negative => signed < 0.0,
            Side::Both => signed != 0.0,
        }
    }
}

// ============================================================================
// Detector Configuration
// ============================================================================

/// Fixed bounds, optionally as a sustained-fraction rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Flag the whole window when at least this fraction of points breach.
    pub percentage: Option<f64>,
    /// Use `>=`/`<=` instead of strict comparisons.
    pub closed: bool,
    pub minimum_length: usize,
}

impl ThresholdConfig {
    pub fn new(high: Option<f64>, low: Option<f64>) -> Self {
        Self {
            high,
            low,
            ..Self::default()
        }
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }
}

/// Empirical quantile bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuantileConfig {
    pub high: f64,
    pub low: f64,
    pub minimum_length: usize,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            high: 1.0,
            low: 0.0,
            minimum_length: 0,
        }
    }
}

/// Interquartile range bounds on raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IqrConfig {
    pub outliers: Outliers,
    pub minimum_length: usize,
}

impl Default for IqrConfig {
    fn default() -> Self {
        Self {
            outliers: (Some(3.0), Some(3.0)),
            minimum_length: 0,
        }
    }
}

impl IqrConfig {
    pub fn new(outliers: Outliers) -> Self {
        Self {
            outliers,
            minimum_length: 0,
        }
    }
}

/// Sudden single-point jump against the preceding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpikeConfig {
    pub outliers: Outliers,
    pub side: Side,
    pub window: usize,
    pub agg: Agg,
    pub minimum_length: usize,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            outliers: (None, Some(3.0)),
            side: Side::Both,
            window: 1,
            agg: Agg::Median,
            minimum_length: 0,
        }
    }
}

/// Change of level between two adjacent windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelShiftConfig {
    pub outliers: Outliers,
    pub side: Side,
    pub window: usize,
    pub agg: Agg,
    pub minimum_length: usize,
}

impl Default for LevelShiftConfig {
    fn default() -> Self {
        Self {
            outliers: (None, Some(6.0)),
            side: Side::Both,
            window: 5,
            agg: Agg::Median,
            minimum_length: 0,
        }
    }
}

/// Relative change of dispersion between two adjacent windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolatilityShiftConfig {
    pub outliers: Outliers,
    pub side: Side,
    pub window: usize,
    pub agg: Agg,
    pub minimum_length: usize,
}

impl Default for VolatilityShiftConfig {
    fn default() -> Self {
        Self {
            outliers: (None, Some(6.0)),
            side: Side::Both,
            window: 10,
            agg: Agg::Std,
            minimum_length: 0,
        }
    }
}

/// Level changes after removing the seasonal component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonalConfig {
    pub outliers: Outliers,
    pub side: Side,
    pub window: usize,
    pub agg: Agg,
    /// Known period in points; detected from the data when absent.
    pub period: Option<usize>,
    pub high_ac_threshold: f64,
    pub min_seasonal_freq: usize,
    pub minimum_length: usize,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            outliers: (None, Some(3.0)),
            side: Side::Both,
            window: 10,
            agg: Agg::Median,
            period: None,
            high_ac_threshold: 0.1,
            min_seasonal_freq: 2,
            minimum_length: 0,
        }
    }
}

impl SeasonalConfig {
    pub fn seasonality(&self) -> SeasonalityConfig {
        SeasonalityConfig {
            detrend_window: None,
            high_ac_threshold: self.high_ac_threshold,
            min_seasonal_freq: self.min_seasonal_freq,
        }
    }
}

/// Slope of the window, per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradientConfig {
    pub side: Side,
    pub max_coef: f64,
    pub minimum_length: usize,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            side: Side::Positive,
            max_coef: 1.0,
            minimum_length: 0,
        }
    }
}

/// Monotonic trend (Cox-Stuart sign test).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncreaseConfig {
    pub side: Side,
    pub alpha: f64,
    pub minimum_length: usize,
}

impl Default for IncreaseConfig {
    fn default() -> Self {
        Self {
            side: Side::Positive,
            alpha: 0.05,
            minimum_length: 0,
        }
    }
}

/// Generalized extreme studentized deviate test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EsdTestConfig {
    pub alpha: f64,
    pub max_outliers_ratio: f64,
    pub minimum_length: usize,
}

impl Default for EsdTestConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_outliers_ratio: 0.2,
            minimum_length: 0,
        }
    }
}

/// Bounds checked against a forecast of the next `horizon_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub horizon_seconds: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub closed: bool,
    pub minimum_length: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_seconds: 3600.0,
            high: None,
            low: None,
            closed: false,
            minimum_length: 0,
        }
    }
}

/// OR-composition of nested detectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnyOfConfig {
    pub detectors: Vec<DetectorConfig>,
    pub minimum_length: usize,
}

/// Configuration of one detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "detector_kind",
    content = "detector_kwargs",
    rename_all = "snake_case"
)]
pub enum DetectorConfig {
    Threshold(ThresholdConfig),
    Quantile(QuantileConfig),
    InterQuartileRange(IqrConfig),
    Spike(SpikeConfig),
    LevelShift(LevelShiftConfig),
    VolatilityShift(VolatilityShiftConfig),
    Seasonal(SeasonalConfig),
    Gradient(GradientConfig),
    Increase(IncreaseConfig),
    EsdTest(EsdTestConfig),
    Forecast(ForecastConfig),
    AnyOf(AnyOfConfig),
}

impl DetectorConfig {
    /// Parse and validate a `(detector_kind, detector_kwargs)` pair.
    pub fn from_parts(kind: &str, kwargs: serde_json::Value) -> Result<Self> {
        let kwargs = if kwargs.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            kwargs
        };
        let document = serde_json::json!({
            "detector_kind": kind,
            "detector_kwargs": kwargs,
        });
        let config: DetectorConfig = serde_json::from_value(document)
            .map_err(|e| DetectorError::invalid("detector_kwargs", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Split into `(detector_kind, detector_kwargs)`.
    pub fn to_parts(&self) -> (String, serde_json::Value) {
        let kwargs = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map
                .remove("detector_kwargs")
                .unwrap_or(serde_json::Value::Null),
            _ => serde_json::Value::Null,
        };
        (self.kind().to_string(), kwargs)
    }

    /// The `detector_kind` tag
    pub fn kind(&self) -> &'static str {
        match self {
            DetectorConfig::Threshold(_) => "threshold",
            DetectorConfig::Quantile(_) => "quantile",
            DetectorConfig::InterQuartileRange(_) => "inter_quartile_range",
            DetectorConfig::Spike(_) => "spike",
            DetectorConfig::LevelShift(_) => "level_shift",
            DetectorConfig::VolatilityShift(_) => "volatility_shift",
            DetectorConfig::Seasonal(_) => "seasonal",
            DetectorConfig::Gradient(_) => "gradient",
            DetectorConfig::Increase(_) => "increase",
            DetectorConfig::EsdTest(_) => "esd_test",
            DetectorConfig::Forecast(_) => "forecast",
            DetectorConfig::AnyOf(_) => "any_of",
        }
    }

    /// Evaluation windows shorter than this are never flagged.
    pub fn minimum_length(&self) -> usize {
        match self {
            DetectorConfig::Threshold(c) => c.minimum_length,
            DetectorConfig::Quantile(c) => c.minimum_length,
            DetectorConfig::InterQuartileRange(c) => c.minimum_length,
            DetectorConfig::Spike(c) => c.minimum_length,
            DetectorConfig::LevelShift(c) => c.minimum_length,
            DetectorConfig::VolatilityShift(c) => c.minimum_length,
            DetectorConfig::Seasonal(c) => c.minimum_length,
            DetectorConfig::Gradient(c) => c.minimum_length,
            DetectorConfig::Increase(c) => c.minimum_length,
            DetectorConfig::EsdTest(c) => c.minimum_length,
            DetectorConfig::Forecast(c) => c.minimum_length,
            DetectorConfig::AnyOf(c) => c.minimum_length,
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        match self {
            DetectorConfig::Threshold(c) => {
                not_nan("high", c.high)?;
                not_nan("low", c.low)?;
                if let Some(p) = c.percentage {
                    in_range("percentage", p, 0.0, 1.0)?;
                }
                Ok(())
            }
            DetectorConfig::Quantile(c) => {
                in_range("high", c.high, 0.0, 1.0)?;
                in_range("low", c.low, 0.0, 1.0)?;
                if c.low > c.high {
                    return Err(DetectorError::invalid("low", "must not exceed high"));
                }
                Ok(())
            }
            DetectorConfig::InterQuartileRange(c) => check_outliers(&c.outliers),
            DetectorConfig::Spike(c) => {
                check_outliers(&c.outliers)?;
                positive_window(c.window)
            }
            DetectorConfig::LevelShift(c) => {
                check_outliers(&c.outliers)?;
                positive_window(c.window)
            }
            DetectorConfig::VolatilityShift(c) => {
                check_outliers(&c.outliers)?;
                positive_window(c.window)
            }
            DetectorConfig::Seasonal(c) => {
                check_outliers(&c.outliers)?;
                positive_window(c.window)?;
                if let Some(period) = c.period {
                    if period < 2 {
                        return Err(DetectorError::invalid("period", "must be at least 2"));
                    }
                }
                in_range("high_ac_threshold", c.high_ac_threshold, -1.0, 1.0)?;
                if c.min_seasonal_freq == 0 {
                    return Err(DetectorError::invalid("min_seasonal_freq", "must be positive"));
                }
                Ok(())
            }
            DetectorConfig::Gradient(c) => {
                if !c.max_coef.is_finite() || c.max_coef < 0.0 {
                    return Err(DetectorError::invalid("max_coef", "must be finite and non-negative"));
                }
                Ok(())
            }
            DetectorConfig::Increase(c) => open_unit("alpha", c.alpha),
            DetectorConfig::EsdTest(c) => {
                open_unit("alpha", c.alpha)?;
                open_unit("max_outliers_ratio", c.max_outliers_ratio)
            }
            DetectorConfig::Forecast(c) => {
                if !c.horizon_seconds.is_finite() || c.horizon_seconds <= 0.0 {
                    return Err(DetectorError::invalid(
                        "horizon_seconds",
                        "must be positive and finite",
                    ));
                }
                not_nan("high", c.high)?;
                not_nan("low", c.low)
            }
            DetectorConfig::AnyOf(c) => {
                if c.detectors.is_empty() {
                    return Err(DetectorError::invalid("detectors", "must not be empty"));
                }
                c.detectors.iter().try_for_each(DetectorConfig::validate)
            }
        }
    }
}

fn not_nan(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if v.is_nan() => Err(DetectorError::invalid(name, "must not be NaN")),
        _ => Ok(()),
    }
}

fn in_range(name: &str, value: f64, low: f64, high: f64) -> Result<()> {
    if !(low..=high).contains(&value) {
        return Err(DetectorError::invalid(
            name,
            format!("must be within [{}, {}]", low, high),
        ));
    }
    Ok(())
}

fn open_unit(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(DetectorError::invalid(name, "must be within (0, 1)"));
    }
    Ok(())
}

fn positive_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(DetectorError::invalid("window", "must be positive"));
    }
    Ok(())
}

fn check_outliers(outliers: &Outliers) -> Result<()> {
    for factor in [outliers.0, outliers.1].into_iter().flatten() {
        if !factor.is_finite() || factor < 0.0 {
            return Err(DetectorError::invalid(
                "outliers",
                "factors must be finite and non-negative",
            ));
        }
    }
    Ok(())
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{AnomalyMask, Detector, DetectorConfig, DetectorError, Result, Side};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_side_matches() {
        assert!(Side::Positive.matches(1.0));
        assert!(!Side::Positive.matches(-1.0));
        assert!(Side::Negative.matches(-0.5));
        assert!(Side::Both.matches(-0.5));
        assert!(!Side::Both.matches(0.0));
    }

    #[test]
    fn test_adjacent_tagging() {
        let config = DetectorConfig::Threshold(ThresholdConfig::new(Some(10.0), None));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["detector_kind"], "threshold");
        assert_eq!(value["detector_kwargs"]["high"], 10.0);
    }

    #[test]
    fn test_from_parts_applies_defaults() {
        let config = DetectorConfig::from_parts("level_shift", json!({"window": 3})).unwrap();
        match config {
            DetectorConfig::LevelShift(c) => {
                assert_eq!(c.window, 3);
                assert_eq!(c.outliers, (None, Some(6.0)));
                assert_eq!(c.agg, Agg::Median);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_from_parts_null_kwargs() {
        let config = DetectorConfig::from_parts("spike", serde_json::Value::Null).unwrap();
        assert_eq!(config, DetectorConfig::Spike(SpikeConfig::default()));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(DetectorConfig::from_parts("magic", json!({})).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = DetectorConfig::from_parts("threshold", json!({"hihg": 1})).unwrap_err();
        assert!(matches!(err, DetectorError::InvalidParameter { .. }));
    }

    #[test]
    fn test_outliers_accept_null_side() {
        let config =
            DetectorConfig::from_parts("inter_quartile_range", json!({"outliers": [null, 1.5]})).unwrap();
        assert_eq!(
            config,
            DetectorConfig::InterQuartileRange(IqrConfig::new((None, Some(1.5))))
        );
    }

    #[test]
    fn test_to_parts_roundtrip() {
        let config = DetectorConfig::Increase(IncreaseConfig {
            side: Side::Negative,
            ..IncreaseConfig::default()
        });
        let (kind, kwargs) = config.to_parts();
        assert_eq!(kind, "increase");
        assert_eq!(DetectorConfig::from_parts(&kind, kwargs).unwrap(), config);
    }

    #[test]
    fn test_validation() {
        let bad_alpha = DetectorConfig::EsdTest(EsdTestConfig {
            alpha: 1.5,
            ..EsdTestConfig::default()
        });
        assert!(bad_alpha.validate().is_err());

        let bad_window = DetectorConfig::Spike(SpikeConfig {
            window: 0,
            ..SpikeConfig::default()
        });
        assert!(bad_window.validate().is_err());

        let bad_quantile = DetectorConfig::Quantile(QuantileConfig {
            high: 0.2,
            low: 0.8,
            minimum_length: 0,
        });
        assert!(bad_quantile.validate().is_err());

        let bad_horizon = DetectorConfig::Forecast(ForecastConfig {
            horizon_seconds: f64::INFINITY,
            ..ForecastConfig::default()
        });
        assert!(bad_horizon.validate().is_err());

        assert!(DetectorConfig::AnyOf(AnyOfConfig::default()).validate().is_err());
    }

    #[test]
    fn test_nested_any_of_validation() {
        let config = DetectorConfig::AnyOf(AnyOfConfig {
            detectors: vec![
                DetectorConfig::Threshold(ThresholdConfig::new(Some(1.0), None)),
                DetectorConfig::Increase(IncreaseConfig {
                    alpha: 0.0,
                    ..IncreaseConfig::default()
                }),
            ],
            minimum_length: 0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimum_length_and_kind() {
        let config = DetectorConfig::from_parts("gradient", json!({"minimum_length": 12})).unwrap();
        assert_eq!(config.minimum_length(), 12);
        assert_eq!(config.kind(), "gradient");
    }
}
