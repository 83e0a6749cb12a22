//! Detector construction from configuration.

use detector_api::DetectorConfig;
use detector_spi::{Detector, Result};

use crate::any_of::AnyOfDetector;
use crate::esd::EsdTestDetector;
use crate::forecast::ForecastDetector;
use crate::gradient::GradientDetector;
use crate::guard::MinimumLength;
use crate::increase::IncreaseDetector;
use crate::quantile::{IqrDetector, QuantileDetector};
use crate::shift::{SeasonalDetector, ShiftDetector};
use crate::threshold::ThresholdDetector;

/// Validate `config` and build the detector it describes.
pub fn build(config: &DetectorConfig) -> Result<Box<dyn Detector>> {
    config.validate()?;
    let detector: Box<dyn Detector> = match config {
        DetectorConfig::Threshold(c) => Box::new(ThresholdDetector::from_config(c)),
        DetectorConfig::Quantile(c) => Box::new(QuantileDetector::from_config(c)),
        DetectorConfig::InterQuartileRange(c) => Box::new(IqrDetector::from_config(c)),
        DetectorConfig::Spike(c) => Box::new(ShiftDetector::spike(c)),
        DetectorConfig::LevelShift(c) => Box::new(ShiftDetector::level_shift(c)),
        DetectorConfig::VolatilityShift(c) => Box::new(ShiftDetector::volatility_shift(c)),
        DetectorConfig::Seasonal(c) => Box::new(SeasonalDetector::from_config(c)),
        DetectorConfig::Gradient(c) => Box::new(GradientDetector::from_config(c)),
        DetectorConfig::Increase(c) => Box::new(IncreaseDetector::from_config(c)),
        DetectorConfig::EsdTest(c) => Box::new(EsdTestDetector::from_config(c)),
        DetectorConfig::Forecast(c) => Box::new(ForecastDetector::from_config(c)),
        DetectorConfig::AnyOf(c) => {
            let nested = c.detectors.iter().map(build).collect::<Result<Vec<_>>>()?;
            Box::new(AnyOfDetector::new(nested))
        }
    };

    Ok(match config.minimum_length() {
        0 => detector,
        minimum_length => Box::new(MinimumLength::new(detector, minimum_length)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use detector_api::{IqrConfig, SpikeConfig, ThresholdConfig};
    use detector_spi::DetectorError;
    use sequence_spi::Sequence;

    #[test]
    fn test_build_every_default_kind() {
        let kinds = [
            "threshold",
            "quantile",
            "inter_quartile_range",
            "spike",
            "level_shift",
            "volatility_shift",
            "seasonal",
            "gradient",
            "increase",
            "esd_test",
            "forecast",
        ];
        for kind in kinds {
            let config = DetectorConfig::from_parts(kind, serde_json::Value::Null).unwrap();
            let detector = build(&config).unwrap();
            assert_eq!(detector.name(), kind);
        }
    }

    #[test]
    fn test_build_rejects_invalid() {
        let config = DetectorConfig::Spike(SpikeConfig {
            window: 0,
            ..SpikeConfig::default()
        });
        assert!(matches!(build(&config), Err(DetectorError::InvalidParameter { .. })));
    }

    #[test]
    fn test_minimum_length_guard() {
        let config = DetectorConfig::Threshold(ThresholdConfig {
            minimum_length: 4,
            ..ThresholdConfig::new(Some(10.0), None)
        });
        let mut detector = build(&config).unwrap();
        let seq = Sequence::from_values(0, 1000, vec![5.0, 12.0, 8.0]);
        assert!(!detector.fit_predict(&seq).unwrap().any());
    }

    #[test]
    fn test_iqr_scenario() {
        let mut detector = build(&DetectorConfig::InterQuartileRange(IqrConfig::default())).unwrap();
        let seq = Sequence::from_values(0, 1000, vec![1.0, 1.0, 1.0, 1.0, 100.0]);
        let mask = detector.fit_predict(&seq).unwrap();
        assert_eq!(mask.flags, vec![false, false, false, false, true]);
    }
}
