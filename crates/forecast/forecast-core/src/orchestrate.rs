//! Forecast orchestration
//!
//! Validates the request, aligns the series to its step and fills gaps,
//! strips seasonality, fits (or reuses) a model, then reassembles the
//! seasonal pattern on the forecast.

use tracing::{debug, warn};

use forecast_spi::{ForecastError, Forecaster, Result, MAX_FORECAST_STEPS};
use sequence_core::{
    decompose, detect_period, sequence_interpolate, stats, tidy_up, trim_head_and_tail_nan,
    SeasonalityConfig,
};
use sequence_spi::Sequence;

use crate::context::ForecastContext;
use crate::model::ForecastModel;

/// What to forecast and how.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub horizon_seconds: f64,
    pub lower: f64,
    pub upper: f64,
    /// Model to reuse instead of selecting a new one
    pub given_model: Option<ForecastModel>,
}

impl ForecastRequest {
    pub fn new(horizon_seconds: f64) -> Self {
        Self {
            horizon_seconds,
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
            given_model: None,
        }
    }

    /// Clamp forecast values to `[lower, upper]`.
    pub fn bounded(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn with_model(mut self, model: ForecastModel) -> Self {
        self.given_model = Some(model);
        self
    }
}

/// Forecast sequence plus the model that produced it.
#[derive(Debug, Clone, Default)]
pub struct ForecastOutcome {
    pub sequence: Option<Sequence>,
    pub model: Option<ForecastModel>,
}

impl ForecastOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.as_ref().map_or(true, Sequence::is_empty)
    }
}

/// Seasonal pattern of the last period, residual clipped to ±3σ.
fn last_period_pattern(seasonal: &[f64], residual: &[f64], period: usize) -> Vec<f64> {
    let sigma = stats::std_dev(&stats::finite(residual));
    let bound = if sigma.is_finite() { 3.0 * sigma } else { 0.0 };
    let start = seasonal.len() - period;
    (start..seasonal.len())
        .map(|i| {
            let r = if residual[i].is_finite() {
                residual[i].clamp(-bound, bound)
            } else {
                0.0
            };
            seasonal[i] + r
        })
        .collect()
}

/// Forecast `sequence` over `request.horizon_seconds`.
///
/// Series too short or too sparse to fit yield an empty outcome; an
/// invalid horizon or a failing model fit is an error. Horizons spanning
/// more than [`MAX_FORECAST_STEPS`] points are invalid.
pub fn forecast_sequence(
    ctx: &mut ForecastContext,
    sequence: &Sequence,
    request: ForecastRequest,
) -> Result<ForecastOutcome> {
    let horizon = request.horizon_seconds;
    if !horizon.is_finite() || horizon <= 0.0 {
        return Err(ForecastError::InvalidHorizon(horizon));
    }
    if sequence.len() < 2 || sequence.values().iter().all(|v| !v.is_finite()) {
        return Ok(ForecastOutcome::empty());
    }
    let aligned = tidy_up(sequence)?;
    let step = aligned.step();
    let last = match aligned.last_timestamp() {
        Some(last) if step > 0 => last,
        _ => return Ok(ForecastOutcome::empty()),
    };

    let steps = (horizon * 1000.0 / step as f64).floor();
    if steps > MAX_FORECAST_STEPS as f64 {
        warn!(horizon, step, "forecast horizon exceeds the step limit");
        return Err(ForecastError::InvalidHorizon(horizon));
    }
    let steps = steps as usize;
    if steps == 0 {
        return Ok(ForecastOutcome::empty());
    }
    (steps as i64)
        .checked_mul(step)
        .and_then(|span| last.checked_add(span))
        .ok_or(ForecastError::InvalidHorizon(horizon))?;

    let filled = sequence_interpolate(&aligned);
    if steps > filled.len() {
        warn!(
            steps,
            history = filled.len(),
            "forecast horizon exceeds the history length"
        );
    }

    let period = detect_period(filled.values(), &SeasonalityConfig::default())
        .filter(|&p| filled.len() >= 2 * p);
    let (training, pattern) = match period {
        Some(p) => {
            let parts = decompose(filled.values(), p)?;
            debug!(period = p, "forecasting the deseasonalised trend");
            let pattern = last_period_pattern(&parts.seasonal, &parts.residual, p);
            (filled.with_values(parts.trend)?, Some(pattern))
        }
        None => (filled.clone(), None),
    };

    let model = match request.given_model {
        Some(mut model) => {
            model.fit(&training)?;
            model
        }
        None => ctx.select(&training)?,
    };

    let mut values = trim_head_and_tail_nan(&model.forecast(steps)?);
    if let Some(pattern) = pattern {
        for (k, value) in values.iter_mut().enumerate() {
            *value += pattern[k % pattern.len()];
        }
    }
    for value in values.iter_mut() {
        *value = value.clamp(request.lower, request.upper);
    }

    let forecast = Sequence::from_values(last + step, step, values)
        .named(sequence.name())
        .with_labels(sequence.labels().clone());
    Ok(ForecastOutcome {
        sequence: Some(forecast),
        model: Some(model),
    })
}
