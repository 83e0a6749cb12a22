//! ARIMA with automatic order selection
//!
//! The differencing order comes from repeated unit-root tests, the ARMA
//! order from a BIC search over conditional-sum-of-squares fits. Forecasts
//! run the ARMA recursion on the demeaned differenced series and integrate
//! back to the original scale.

pub mod css;
pub mod estimate;
pub mod optimize;
pub mod order;
pub mod stationarity;
pub mod transform;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use forecast_spi::{check_steps, ArimaOrder, ForecastError, Forecaster, Result};
use sequence_spi::Sequence;

use order::{fit_arma, select_order, ArmaFit};
use stationarity::{difference, select_d};

/// Largest differencing order tried by the unit-root search.
pub const DEFAULT_MAX_D: usize = 2;
/// Largest accepted AR or MA order.
pub const MAX_ARMA_ORDER: usize = 10;
/// Observations left after differencing below which no model is fitted.
const MIN_OBSERVATIONS: usize = 3;

/// ARIMA model for time series forecasting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arima {
    max_d: usize,
    /// Order forced by the caller instead of searched
    fixed_order: Option<ArimaOrder>,
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Mean of the differenced series
    mean: f64,
    sigma2: f64,
    bic: f64,
    history: Vec<f64>,
    /// Demeaned differenced series
    differenced: Vec<f64>,
    /// Last value of each difference level `0..d`
    tails: Vec<f64>,
    residuals: Vec<f64>,
    fitted: bool,
    avoid_repetitive_fitting: bool,
}

impl Default for Arima {
    fn default() -> Self {
        Self::new()
    }
}

impl Arima {
    /// Model with automatic order selection.
    pub fn new() -> Self {
        Self {
            max_d: DEFAULT_MAX_D,
            fixed_order: None,
            order: ArimaOrder::default(),
            ar: Vec::new(),
            ma: Vec::new(),
            mean: 0.0,
            sigma2: f64::NAN,
            bic: f64::NAN,
            history: Vec::new(),
            differenced: Vec::new(),
            tails: Vec::new(),
            residuals: Vec::new(),
            fitted: false,
            avoid_repetitive_fitting: false,
        }
    }

    /// Model with a fixed `(p, d, q)`.
    pub fn with_order(order: ArimaOrder) -> Result<Self> {
        if order.p > MAX_ARMA_ORDER {
            return Err(ForecastError::InvalidParameter {
                name: "p".to_string(),
                reason: format!("AR order must be <= {}", MAX_ARMA_ORDER),
            });
        }
        if order.d > DEFAULT_MAX_D {
            return Err(ForecastError::InvalidParameter {
                name: "d".to_string(),
                reason: format!("Differencing order must be <= {}", DEFAULT_MAX_D),
            });
        }
        if order.q > MAX_ARMA_ORDER {
            return Err(ForecastError::InvalidParameter {
                name: "q".to_string(),
                reason: format!("MA order must be <= {}", MAX_ARMA_ORDER),
            });
        }
        let mut model = Self::new();
        model.fixed_order = Some(order);
        Ok(model)
    }

    /// Keep the fitted coefficients across `fit` calls until `refit()`.
    pub fn fit_once(mut self) -> Self {
        self.avoid_repetitive_fitting = true;
        self
    }

    /// Discard the fitted state so the next `fit` estimates from scratch.
    pub fn refit(&mut self) {
        self.fitted = false;
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Fit on raw values.
    pub fn fit_values(&mut self, data: &[f64]) -> Result<()> {
        if data.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: data.len(),
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NumericalError(
                "Data contains NaN or infinite values".to_string(),
            ));
        }

        if self.fitted && self.avoid_repetitive_fitting {
            return self.reanchor(data);
        }

        let mut d = match self.fixed_order {
            Some(order) => order.d,
            None => select_d(data, self.max_d),
        };
        while d > 0 && data.len() - d < MIN_OBSERVATIONS {
            d -= 1;
        }

        let (differenced, mean, tails) = prepare(data, d);
        let fit = match self.fixed_order {
            Some(order) => fit_arma(&differenced, order.p, order.q),
            None => select_order(&differenced),
        };
        debug!(order = %ArimaOrder::new(fit.p, d, fit.q), bic = fit.bic, "selected ARIMA order");

        self.install(data, d, differenced, mean, tails, fit);
        Ok(())
    }

    /// Forecast `steps` values past the end of the fitted history.
    ///
    /// A forecast that is not finite or leaves the envelope of the
    /// differenced history is retried once with `(1, d, 0)`.
    pub fn forecast_values(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        check_steps(steps)?;
        if steps == 0 {
            return Ok(Vec::new());
        }

        let differenced = self.forecast_differenced(steps);
        let history_diff: Vec<f64> = self.differenced.iter().map(|v| v + self.mean).collect();
        if within_envelope(&history_diff, &differenced) {
            return Ok(self.integrate(&differenced));
        }

        warn!(order = %self.order, "implausible ARIMA forecast, refitting with (1, d, 0)");
        let mut fallback = Arima::with_order(ArimaOrder::new(1, self.order.d, 0))?;
        fallback.fit_values(&self.history)?;
        let retried = fallback.forecast_differenced(steps);
        if !within_envelope(&history_diff, &retried) {
            warn!("fallback ARIMA forecast is still implausible, returning it as is");
        }
        Ok(fallback.integrate(&retried))
    }

    fn install(
        &mut self,
        data: &[f64],
        d: usize,
        differenced: Vec<f64>,
        mean: f64,
        tails: Vec<f64>,
        fit: ArmaFit,
    ) {
        self.order = ArimaOrder::new(fit.p, d, fit.q);
        self.ar = fit.ar;
        self.ma = fit.ma;
        self.sigma2 = fit.sigma2;
        self.bic = fit.bic;
        self.residuals = fit.residuals;
        self.mean = mean;
        self.differenced = differenced;
        self.tails = tails;
        self.history = data.to_vec();
        self.fitted = true;
    }

    /// Move the model onto new data, keeping order, coefficients and mean.
    fn reanchor(&mut self, data: &[f64]) -> Result<()> {
        let d = self.order.d;
        if data.len() < d + MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                required: d + MIN_OBSERVATIONS,
                actual: data.len(),
            });
        }
        let raw = difference(data, d);
        self.differenced = raw.iter().map(|v| v - self.mean).collect();
        self.tails = (0..d).filter_map(|k| difference(data, k).last().copied()).collect();
        self.residuals = css::css_residuals(&self.differenced, &self.ar, &self.ma);
        self.history = data.to_vec();
        Ok(())
    }

    /// ARMA recursion with zero future innovations; mean restored.
    fn forecast_differenced(&self, steps: usize) -> Vec<f64> {
        let p = self.ar.len();
        let q = self.ma.len();
        let mut z = self.differenced.clone();
        let mut e = self.residuals.clone();

        for _ in 0..steps {
            let t = z.len();
            let mut next = 0.0;
            for i in 0..p.min(t) {
                next += self.ar[i] * z[t - 1 - i];
            }
            for j in 0..q.min(e.len()) {
                next += self.ma[j] * e[e.len() - 1 - j];
            }
            z.push(next);
            e.push(0.0);
        }

        z[self.differenced.len()..]
            .iter()
            .map(|v| v + self.mean)
            .collect()
    }

    /// Undo differencing with cumulative sums seeded by each level's tail.
    fn integrate(&self, differenced: &[f64]) -> Vec<f64> {
        let mut result = differenced.to_vec();
        for level in (0..self.tails.len()).rev() {
            let mut acc = self.tails[level];
            for value in result.iter_mut() {
                acc += *value;
                *value = acc;
            }
        }
        result
    }
}

/// Difference `d` times and demean; also return the tail of each level.
fn prepare(data: &[f64], d: usize) -> (Vec<f64>, f64, Vec<f64>) {
    let mut tails = Vec::with_capacity(d);
    let mut level = data.to_vec();
    for _ in 0..d {
        if let Some(&last) = level.last() {
            tails.push(last);
        }
        level = difference(&level, 1);
    }
    let mean = level.iter().sum::<f64>() / level.len().max(1) as f64;
    let demeaned = level.iter().map(|v| v - mean).collect();
    (demeaned, mean, tails)
}

/// True when every forecast value is finite and within mean ± 3σ of the history.
pub fn within_envelope(history: &[f64], forecast: &[f64]) -> bool {
    if forecast.iter().any(|v| !v.is_finite()) {
        return false;
    }
    if history.is_empty() {
        return true;
    }
    let n = history.len() as f64;
    let mean = history.iter().sum::<f64>() / n;
    let sigma = (history.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let slack = 3.0 * sigma + 1e-9 * (1.0 + mean.abs());
    forecast.iter().all(|v| (v - mean).abs() <= slack)
}

impl Forecaster for Arima {
    fn fit(&mut self, sequence: &Sequence) -> Result<()> {
        self.fit_values(sequence.values())
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        self.forecast_values(steps)
    }

    fn name(&self) -> &'static str {
        "arima"
    }
}
