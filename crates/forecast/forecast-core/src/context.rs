//! Per-worker model factory

use tracing::debug;

use forecast_spi::{Forecaster, Result};
use sequence_spi::Sequence;

use crate::arima::Arima;
use crate::linear::LinearFit;
use crate::model::ForecastModel;

/// Goodness of fit above which the linear model wins.
pub const LINEAR_R2_THRESHOLD: f64 = 0.9;

/// Model instances reused by one worker across forecasts.
///
/// Not shared between threads; each worker owns its own context.
#[derive(Debug, Clone)]
pub struct ForecastContext {
    linear: LinearFit,
    arima: Arima,
    r2_threshold: f64,
}

impl Default for ForecastContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastContext {
    pub fn new() -> Self {
        Self {
            linear: LinearFit::new(),
            arima: Arima::new(),
            r2_threshold: LINEAR_R2_THRESHOLD,
        }
    }

    pub fn with_r2_threshold(mut self, threshold: f64) -> Self {
        self.r2_threshold = threshold;
        self
    }

    /// Fit the linear model; keep it when its r² clears the threshold,
    /// otherwise fit ARIMA.
    pub fn select(&mut self, sequence: &Sequence) -> Result<ForecastModel> {
        self.linear.refit();
        let r2 = match self.linear.fit(sequence) {
            Ok(()) => self.linear.r2(),
            Err(e) => {
                debug!(error = %e, "linear fit unavailable");
                None
            }
        };
        if let Some(r2) = r2 {
            if r2 >= self.r2_threshold {
                debug!(r2, "selected linear model");
                return Ok(ForecastModel::Linear(self.linear.clone()));
            }
        }

        self.arima.refit();
        self.arima.fit(sequence)?;
        debug!(r2 = ?r2, order = %self.arima.order(), "selected ARIMA model");
        Ok(ForecastModel::Arima(self.arima.clone()))
    }
}
