//! Fitted forecasting model

use forecast_spi::{Forecaster, Result};
use sequence_spi::Sequence;

use crate::arima::Arima;
use crate::linear::LinearFit;

/// The model families the selector can choose from.
#[derive(Debug, Clone)]
pub enum ForecastModel {
    Linear(LinearFit),
    Arima(Arima),
}

impl ForecastModel {
    /// Keep the fitted coefficients when this model is fitted again.
    pub fn fit_once(self) -> Self {
        match self {
            ForecastModel::Arima(model) => ForecastModel::Arima(model.fit_once()),
            linear => linear,
        }
    }

    pub fn as_arima(&self) -> Option<&Arima> {
        match self {
            ForecastModel::Arima(model) => Some(model),
            ForecastModel::Linear(_) => None,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearFit> {
        match self {
            ForecastModel::Linear(model) => Some(model),
            ForecastModel::Arima(_) => None,
        }
    }
}

impl Forecaster for ForecastModel {
    fn fit(&mut self, sequence: &Sequence) -> Result<()> {
        match self {
            ForecastModel::Linear(model) => model.fit(sequence),
            ForecastModel::Arima(model) => model.fit(sequence),
        }
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        match self {
            ForecastModel::Linear(model) => model.forecast(steps),
            ForecastModel::Arima(model) => model.forecast(steps),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ForecastModel::Linear(model) => model.name(),
            ForecastModel::Arima(model) => model.name(),
        }
    }
}

impl From<LinearFit> for ForecastModel {
    fn from(model: LinearFit) -> Self {
        ForecastModel::Linear(model)
    }
}

impl From<Arima> for ForecastModel {
    fn from(model: Arima) -> Self {
        ForecastModel::Arima(model)
    }
}
