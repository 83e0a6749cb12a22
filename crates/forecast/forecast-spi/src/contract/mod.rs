//! Contract module containing trait definitions for forecasting

mod forecaster;

pub use forecaster::{check_steps, Forecaster, MAX_FORECAST_STEPS};
