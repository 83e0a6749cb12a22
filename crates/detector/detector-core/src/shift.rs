//! Rolling-window change detectors.
//!
//! Spike, level shift and volatility shift share one pipeline: a signed
//! double-rolling difference, IQR bounds fitted on its magnitude, and a sign
//! gate selecting the direction of interest. The seasonal detector runs the
//! same pipeline after removing the seasonal component.

use detector_api::{
    LevelShiftConfig, Outliers, SeasonalConfig, Side, SpikeConfig, VolatilityShiftConfig,
};
use detector_spi::{AnomalyMask, Detector, DetectorError, Result};
use sequence_core::{decompose, detect_period, interpolate_linear, stats, Agg, DiffMode};
use sequence_spi::Sequence;

use crate::quantile::IqrBounds;

/// Double-rolling change detector.
#[derive(Debug, Clone)]
pub struct ShiftDetector {
    kind: &'static str,
    outliers: Outliers,
    side: Side,
    window: (usize, usize),
    agg: Agg,
    mode: DiffMode,
    bounds: Option<IqrBounds>,
}

impl ShiftDetector {
    pub fn new(
        kind: &'static str,
        outliers: Outliers,
        side: Side,
        window: (usize, usize),
        agg: Agg,
        mode: DiffMode,
    ) -> Self {
        Self {
            kind,
            outliers,
            side,
            window,
            agg,
            mode,
            bounds: None,
        }
    }

    /// A point against the window preceding it.
    pub fn spike(config: &SpikeConfig) -> Self {
        Self::new(
            "spike",
            config.outliers,
            config.side,
            (config.window, 1),
            config.agg,
            DiffMode::Diff,
        )
    }

    /// Two adjacent windows of equal width.
    pub fn level_shift(config: &LevelShiftConfig) -> Self {
        Self::new(
            "level_shift",
            config.outliers,
            config.side,
            (config.window, config.window),
            config.agg,
            DiffMode::Diff,
        )
    }

    /// Ratio change of the window aggregate (standard deviation by default).
    pub fn volatility_shift(config: &VolatilityShiftConfig) -> Self {
        Self::new(
            "volatility_shift",
            config.outliers,
            config.side,
            (config.window, config.window),
            config.agg,
            DiffMode::Rel,
        )
    }

    pub fn bounds(&self) -> Option<IqrBounds> {
        self.bounds
    }

    fn signed_change(&self, values: &[f64]) -> Vec<f64> {
        stats::double_rolling(values, self.window, self.agg, self.mode)
    }

    pub(crate) fn fit_values(&mut self, values: &[f64]) -> Result<()> {
        let magnitude: Vec<f64> = self.signed_change(values).iter().map(|d| d.abs()).collect();
        self.bounds = Some(IqrBounds::fit(&magnitude, &self.outliers)?);
        Ok(())
    }

    pub(crate) fn predict_values(&self, values: &[f64]) -> Result<Vec<bool>> {
        let bounds = self.bounds.ok_or(DetectorError::NotFitted)?;
        let change = self.signed_change(values);
        Ok(values
            .iter()
            .zip(change)
            .map(|(v, d)| v.is_finite() && bounds.is_outlier(d.abs()) && self.side.matches(d))
            .collect())
    }
}

impl Default for ShiftDetector {
    fn default() -> Self {
        Self::spike(&SpikeConfig::default())
    }
}

impl Detector for ShiftDetector {
    fn name(&self) -> &'static str {
        self.kind
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        self.fit_values(train.values())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        AnomalyMask::for_sequence(eval, self.predict_values(eval.values())?)
    }
}

/// Spike detection on the deseasonalized series.
#[derive(Debug, Clone)]
pub struct SeasonalDetector {
    config: SeasonalConfig,
    period: Option<usize>,
    shift: ShiftDetector,
}

impl SeasonalDetector {
    pub fn from_config(config: &SeasonalConfig) -> Self {
        Self {
            config: config.clone(),
            period: config.period,
            shift: ShiftDetector::new(
                "seasonal",
                config.outliers,
                config.side,
                (config.window, 1),
                config.agg,
                DiffMode::Diff,
            ),
        }
    }

    /// Period used for deseasonalizing, once known.
    pub fn period(&self) -> Option<usize> {
        self.period
    }

    /// Subtract the seasonal component; missing points stay missing.
    fn deseasonalize(&self, values: &[f64]) -> Vec<f64> {
        let Some(period) = self.period else {
            return values.to_vec();
        };
        let filled = interpolate_linear(values);
        if filled.iter().any(|v| !v.is_finite()) {
            return values.to_vec();
        }
        match decompose(&filled, period) {
            Ok(decomposition) => values
                .iter()
                .zip(decomposition.seasonal)
                .map(|(v, s)| v - s)
                .collect(),
            Err(e) => {
                tracing::debug!(period, error = %e, "window too short to deseasonalize");
                values.to_vec()
            }
        }
    }
}

impl Default for SeasonalDetector {
    fn default() -> Self {
        Self::from_config(&SeasonalConfig::default())
    }
}

impl Detector for SeasonalDetector {
    fn name(&self) -> &'static str {
        "seasonal"
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        if self.config.period.is_none() {
            let filled = interpolate_linear(train.values());
            self.period = detect_period(&filled, &self.config.seasonality());
            tracing::debug!(period = ?self.period, "seasonal period detection");
        }
        let values = self.deseasonalize(train.values());
        self.shift.fit_values(&values)
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let values = self.deseasonalize(eval.values());
        AnomalyMask::for_sequence(eval, self.shift.predict_values(&values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn seq(values: Vec<f64>) -> Sequence {
        Sequence::from_values(0, 60_000, values)
    }

    fn noisy(n: usize, level: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| level + rng.gen_range(-0.5..0.5)).collect()
    }

    #[test]
    fn test_spike_flags_jump() {
        let mut values = noisy(60, 10.0, 7);
        values[40] = 40.0;
        let mut detector = ShiftDetector::spike(&SpikeConfig {
            side: Side::Positive,
            ..SpikeConfig::default()
        });
        let mask = detector.fit_predict(&seq(values)).unwrap();
        assert!(mask.flags[40]);
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_spike_side_gate() {
        let mut values = noisy(60, 10.0, 11);
        values[30] = -20.0;
        let mut positive = ShiftDetector::spike(&SpikeConfig {
            side: Side::Positive,
            ..SpikeConfig::default()
        });
        let mask = positive.fit_predict(&seq(values.clone())).unwrap();
        assert!(!mask.flags[30]);

        let mut negative = ShiftDetector::spike(&SpikeConfig {
            side: Side::Negative,
            ..SpikeConfig::default()
        });
        let mask = negative.fit_predict(&seq(values)).unwrap();
        assert!(mask.flags[30]);
    }

    #[test]
    fn test_level_shift() {
        let mut values = noisy(40, 10.0, 3);
        values.extend(noisy(40, 30.0, 4));
        let mut detector = ShiftDetector::level_shift(&LevelShiftConfig::default());
        let mask = detector.fit_predict(&seq(values)).unwrap();
        assert!(mask.flags[40]);
        assert!(!mask.flags[10]);
        assert!(!mask.flags[70]);
    }

    #[test]
    fn test_volatility_shift() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut values: Vec<f64> = (0..60).map(|_| 10.0 + rng.gen_range(-0.1..0.1)).collect();
        values.extend((0..60).map(|_| 10.0 + rng.gen_range(-5.0..5.0)));
        let mut detector = ShiftDetector::volatility_shift(&VolatilityShiftConfig {
            side: Side::Positive,
            ..VolatilityShiftConfig::default()
        });
        let mask = detector.fit_predict(&seq(values)).unwrap();
        let first = mask.first_true().unwrap();
        assert!((50..=61).contains(&first), "first flag at {}", first);
    }

    #[test]
    fn test_predict_before_fit() {
        let detector = ShiftDetector::default();
        assert!(matches!(
            detector.predict(&seq(vec![1.0, 2.0])),
            Err(DetectorError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_on_history_predict_on_recent() {
        let history = seq(noisy(100, 5.0, 21));
        let recent = Sequence::from_values(6_000_000, 60_000, vec![5.1, 4.9, 25.0, 5.0]);
        let mut detector = ShiftDetector::spike(&SpikeConfig {
            side: Side::Positive,
            ..SpikeConfig::default()
        });
        detector.fit(&history).unwrap();
        let mask = detector.predict(&recent).unwrap();
        assert_eq!(mask.flags, vec![false, false, true, false]);
    }

    #[test]
    fn test_seasonal_detects_break_in_pattern() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut values: Vec<f64> = (0..240)
            .map(|i| 50.0 + 20.0 * (2.0 * PI * i as f64 / 24.0).sin() + rng.gen_range(-0.5..0.5))
            .collect();
        values[200] += 30.0;
        let mut detector = SeasonalDetector::from_config(&SeasonalConfig {
            side: Side::Positive,
            window: 3,
            ..SeasonalConfig::default()
        });
        let mask = detector.fit_predict(&seq(values)).unwrap();
        assert_eq!(detector.period(), Some(24));
        assert!(mask.flags[200]);
        assert!(mask.count() <= 3);
    }

    #[test]
    fn test_seasonal_short_series_has_no_period() {
        let mut detector = SeasonalDetector::default();
        let data = seq(vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        let mask = detector.fit_predict(&data).unwrap();
        assert_eq!(detector.period(), None);
        assert_eq!(mask.len(), 6);
    }
}
