//! Forecast Service Provider Interface
//!
//! Defines the forecaster contract, the ARIMA order model and the
//! forecasting error type.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{check_steps, Forecaster, MAX_FORECAST_STEPS};
pub use error::{ForecastError, Result};
pub use model::ArimaOrder;
