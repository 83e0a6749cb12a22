//! Trait for forecasting models

use sequence_spi::Sequence;

use crate::error::{ForecastError, Result};

/// Upper bound on the number of points a single forecast may produce.
pub const MAX_FORECAST_STEPS: usize = 100_000;

/// Reject step counts above [`MAX_FORECAST_STEPS`].
pub fn check_steps(steps: usize) -> Result<()> {
    if steps > MAX_FORECAST_STEPS {
        return Err(ForecastError::InvalidParameter {
            name: "steps".to_string(),
            reason: format!("{} exceeds the maximum of {}", steps, MAX_FORECAST_STEPS),
        });
    }
    Ok(())
}

/// A model fitted on a sequence and extrapolating it step by step.
pub trait Forecaster: Send {
    /// Fit the model to a fully defined sequence
    fn fit(&mut self, sequence: &Sequence) -> Result<()>;

    /// Forecast the next `steps` values after the fitted sequence
    fn forecast(&self, steps: usize) -> Result<Vec<f64>>;

    /// Short model identifier
    fn name(&self) -> &'static str;
}
