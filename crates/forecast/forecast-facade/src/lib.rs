//! Forecast Facade
//!
//! High-level API for forecasting. Re-exports all public types from the
//! forecast stack for convenient usage.

pub use forecast_spi::{ArimaOrder, ForecastError, Forecaster, Result, MAX_FORECAST_STEPS};

// Re-export core modules for direct access
pub use forecast_core::{arima, context, linear, model, orchestrate};

pub use forecast_core::{
    forecast_sequence, within_envelope, Arima, ForecastContext, ForecastModel,
    ForecastOutcome, ForecastRequest, LinearFit, LINEAR_R2_THRESHOLD,
};

pub mod prelude {
    pub use forecast_core::{
        forecast_sequence, Arima, ForecastContext, ForecastModel, ForecastOutcome,
        ForecastRequest, LinearFit,
    };
    pub use forecast_spi::{ForecastError, Forecaster};
}
