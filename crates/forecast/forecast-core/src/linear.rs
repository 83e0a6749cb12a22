//! Least-squares linear trend model

use serde::{Deserialize, Serialize};

use forecast_spi::{check_steps, ForecastError, Forecaster, Result};
use sequence_core::{linear_fit, LinearFitResult};
use sequence_spi::Sequence;

/// Straight line fitted against elapsed seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearFit {
    avoid_repetitive_fitting: bool,
    fit: Option<LinearFitResult>,
    /// Timestamp (ms) at which elapsed seconds are zero
    origin: i64,
    last_timestamp: i64,
    step: i64,
}

impl Default for LinearFit {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearFit {
    pub fn new() -> Self {
        Self {
            avoid_repetitive_fitting: true,
            fit: None,
            origin: 0,
            last_timestamp: 0,
            step: 0,
        }
    }

    /// Re-estimate on every `fit` call.
    pub fn always_refit(mut self) -> Self {
        self.avoid_repetitive_fitting = false;
        self
    }

    /// Drop the fitted line so the next `fit` estimates from scratch.
    pub fn refit(&mut self) {
        self.fit = None;
    }

    pub fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }

    pub fn r2(&self) -> Option<f64> {
        self.fit.map(|f| f.r2)
    }

    /// Slope in value units per second.
    pub fn slope(&self) -> Option<f64> {
        self.fit.map(|f| f.slope)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.map(|f| f.intercept)
    }

    fn seconds(&self, timestamp: i64) -> f64 {
        (timestamp - self.origin) as f64 / 1000.0
    }
}

impl Forecaster for LinearFit {
    /// While fitted in fit-once mode only the forecast anchor (last
    /// timestamp and step) follows the new series.
    fn fit(&mut self, sequence: &Sequence) -> Result<()> {
        let last = sequence.last_timestamp().ok_or(ForecastError::InsufficientData {
            required: 2,
            actual: 0,
        })?;

        if self.fit.is_some() && self.avoid_repetitive_fitting {
            self.last_timestamp = last;
            self.step = sequence.step();
            return Ok(());
        }

        let origin = sequence.first_timestamp().unwrap_or(last);
        let xs: Vec<f64> = sequence
            .timestamps()
            .iter()
            .map(|t| (t - origin) as f64 / 1000.0)
            .collect();
        let fit = linear_fit(&xs, sequence.values()).ok_or(ForecastError::InsufficientData {
            required: 2,
            actual: sequence.values().iter().filter(|v| v.is_finite()).count(),
        })?;

        self.fit = Some(fit);
        self.origin = origin;
        self.last_timestamp = last;
        self.step = sequence.step();
        Ok(())
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let fit = self.fit.ok_or(ForecastError::NotFitted)?;
        check_steps(steps)?;
        (1..=steps as i64)
            .map(|k| {
                k.checked_mul(self.step)
                    .and_then(|offset| self.last_timestamp.checked_add(offset))
                    .map(|t| fit.at(self.seconds(t)))
                    .ok_or_else(|| {
                        ForecastError::NumericalError("forecast timestamp overflows".to_string())
                    })
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
