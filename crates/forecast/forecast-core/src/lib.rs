//! Forecast Core
//!
//! Linear and ARIMA forecasters, the per-worker model selector and the
//! orchestration that wraps them with gap filling and seasonal
//! decomposition.

pub mod arima;
pub mod context;
pub mod linear;
pub mod model;
pub mod orchestrate;

// Re-export SPI types for implementations
pub use forecast_spi::{ArimaOrder, ForecastError, Forecaster, Result, MAX_FORECAST_STEPS};

pub use arima::{within_envelope, Arima};
pub use context::{ForecastContext, LINEAR_R2_THRESHOLD};
pub use linear::LinearFit;
pub use model::ForecastModel;
pub use orchestrate::{forecast_sequence, ForecastOutcome, ForecastRequest};
