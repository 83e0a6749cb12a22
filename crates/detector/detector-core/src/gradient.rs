//! Slope detector.

use detector_api::{GradientConfig, Side, SpikeConfig};
use detector_spi::{AnomalyMask, Detector, Result};
use sequence_core::{linear_fit, remove_spikes};
use sequence_spi::Sequence;

use crate::shift::ShiftDetector;
use crate::{elapsed_seconds, window_verdict};

/// Flags the whole window when its slope (units per second) exceeds `max_coef`.
///
/// Spikes are replaced by their predecessor before the line is fitted.
#[derive(Debug, Clone)]
pub struct GradientDetector {
    side: Side,
    max_coef: f64,
}

impl GradientDetector {
    pub fn new(side: Side, max_coef: f64) -> Self {
        Self { side, max_coef }
    }

    pub fn from_config(config: &GradientConfig) -> Self {
        Self::new(config.side, config.max_coef)
    }

    /// Slope of the despiked window, per second.
    pub fn slope(&self, sequence: &Sequence) -> Option<f64> {
        let values = sequence.values();
        let mut spike = ShiftDetector::spike(&SpikeConfig::default());
        let cleaned = match spike
            .fit_values(values)
            .and_then(|_| spike.predict_values(values))
        {
            Ok(flags) => remove_spikes(values, &flags),
            Err(_) => values.to_vec(),
        };
        let xs = elapsed_seconds(sequence.timestamps());
        linear_fit(&xs, &cleaned).map(|fit| fit.slope)
    }
}

impl Default for GradientDetector {
    fn default() -> Self {
        Self::from_config(&GradientConfig::default())
    }
}

impl Detector for GradientDetector {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn fit(&mut self, _train: &Sequence) -> Result<()> {
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let steep = match self.slope(eval) {
            Some(slope) => match self.side {
                Side::Positive => slope > self.max_coef,
                Side::Negative => slope < -self.max_coef,
                Side::Both => slope.abs() > self.max_coef,
            },
            None => false,
        };
        Ok(window_verdict(eval, steep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(per_second: f64) -> Sequence {
        // one point every 10 seconds
        Sequence::from_values(0, 10_000, (0..30).map(|i| i as f64 * 10.0 * per_second).collect())
    }

    #[test]
    fn test_slope_per_second() {
        let detector = GradientDetector::default();
        let slope = detector.slope(&ramp(2.0)).unwrap();
        assert!((slope - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_steep_ramp_flags_window() {
        let detector = GradientDetector::new(Side::Positive, 1.0);
        let mask = detector.predict(&ramp(2.0)).unwrap();
        assert_eq!(mask.count(), 30);
        assert!(!detector.predict(&ramp(0.5)).unwrap().any());
        assert!(!detector.predict(&ramp(-2.0)).unwrap().any());
    }

    #[test]
    fn test_negative_and_both() {
        let negative = GradientDetector::new(Side::Negative, 1.0);
        assert!(negative.predict(&ramp(-2.0)).unwrap().any());
        let both = GradientDetector::new(Side::Both, 1.0);
        assert!(both.predict(&ramp(-2.0)).unwrap().any());
        assert!(both.predict(&ramp(2.0)).unwrap().any());
    }

    #[test]
    fn test_single_spike_does_not_tilt() {
        let mut values = vec![5.0; 30];
        values[29] = 10_000.0;
        let flat_with_spike = Sequence::from_values(0, 10_000, values);
        let detector = GradientDetector::new(Side::Positive, 1.0);
        assert!(!detector.predict(&flat_with_spike).unwrap().any());
    }

    #[test]
    fn test_too_short() {
        let detector = GradientDetector::default();
        let mask = detector.predict(&Sequence::from_values(0, 1000, vec![1.0])).unwrap();
        assert!(!mask.any());
    }
}
