//! Forecast-based detector.

use forecast_core::{forecast_sequence, ForecastContext, ForecastRequest};

use detector_api::{ForecastConfig, ThresholdConfig};
use detector_spi::{AnomalyMask, Detector, DetectorError, Result};
use sequence_spi::Sequence;

use crate::threshold::ThresholdDetector;
use crate::window_verdict;

/// Flags the whole evaluation window when the forecast of the training
/// window breaches the bounds within `horizon_seconds`.
///
/// Models are selected through a context owned by the detector and reused
/// across fits.
#[derive(Debug, Clone)]
pub struct ForecastDetector {
    horizon_seconds: f64,
    threshold: ThresholdDetector,
    context: ForecastContext,
    forecast: Option<Vec<f64>>,
}

impl ForecastDetector {
    pub fn from_config(config: &ForecastConfig) -> Self {
        let threshold = ThresholdDetector::from_config(&ThresholdConfig {
            high: config.high,
            low: config.low,
            closed: config.closed,
            ..ThresholdConfig::default()
        });
        Self {
            horizon_seconds: config.horizon_seconds,
            threshold,
            context: ForecastContext::new(),
            forecast: None,
        }
    }

    /// Forecast values computed by the last fit.
    pub fn forecast(&self) -> Option<&[f64]> {
        self.forecast.as_deref()
    }
}

impl Detector for ForecastDetector {
    fn name(&self) -> &'static str {
        "forecast"
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        let request = ForecastRequest::new(self.horizon_seconds);
        let outcome = forecast_sequence(&mut self.context, train, request)
            .map_err(|e| DetectorError::Forecast(e.to_string()))?;
        self.forecast = Some(
            outcome
                .sequence
                .map(|s| s.values().to_vec())
                .unwrap_or_default(),
        );
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let forecast = self.forecast.as_ref().ok_or(DetectorError::NotFitted)?;
        let breached = forecast.iter().any(|&v| self.threshold.breaches(v));
        Ok(window_verdict(eval, breached))
    }
}
