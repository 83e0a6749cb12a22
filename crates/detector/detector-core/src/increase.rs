//! Monotonic trend detector.

use detector_api::{IncreaseConfig, Side};
use detector_spi::{AnomalyMask, Detector, Result};
use sequence_core::linear_fit;
use sequence_spi::Sequence;

use crate::binomial::cox_stuart;
use crate::{elapsed_seconds, window_verdict};

/// Flags the whole window when it trends in the configured direction.
///
/// A trend needs both a significant Cox-Stuart sign test and a linear
/// slope of the same sign.
#[derive(Debug, Clone)]
pub struct IncreaseDetector {
    side: Side,
    alpha: f64,
}

impl IncreaseDetector {
    pub fn new(side: Side, alpha: f64) -> Self {
        Self { side, alpha }
    }

    pub fn from_config(config: &IncreaseConfig) -> Self {
        Self::new(config.side, config.alpha)
    }

    fn trending(&self, sequence: &Sequence) -> bool {
        let (timestamps, values): (Vec<i64>, Vec<f64>) = sequence
            .timestamps()
            .iter()
            .zip(sequence.values())
            .filter(|(_, v)| v.is_finite())
            .map(|(&t, &v)| (t, v))
            .unzip();
        if values.len() < 2 {
            return false;
        }

        let test = cox_stuart(&values);
        let Some(fit) = linear_fit(&elapsed_seconds(&timestamps), &values) else {
            return false;
        };
        tracing::debug!(
            p_increase = test.p_increase,
            p_decrease = test.p_decrease,
            slope = fit.slope,
            "cox-stuart trend test"
        );

        let increasing = test.p_increase < self.alpha && fit.slope > 0.0;
        let decreasing = test.p_decrease < self.alpha && fit.slope < 0.0;
        match self.side {
            Side::Positive => increasing,
            Side::Negative => decreasing,
            Side::Both => increasing || decreasing,
        }
    }
}

impl Default for IncreaseDetector {
    fn default() -> Self {
        Self::from_config(&IncreaseConfig::default())
    }
}

impl Detector for IncreaseDetector {
    fn name(&self) -> &'static str {
        "increase"
    }

    fn fit(&mut self, _train: &Sequence) -> Result<()> {
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        Ok(window_verdict(eval, self.trending(eval)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn seq(values: Vec<f64>) -> Sequence {
        Sequence::from_values(0, 1000, values)
    }

    #[test]
    fn test_increasing_sequence_flags_all() {
        let mut detector = IncreaseDetector::new(Side::Positive, 0.05);
        let mask = detector
            .fit_predict(&seq((1..=10).map(|i| i as f64).collect()))
            .unwrap();
        assert_eq!(mask.flags, vec![true; 10]);
    }

    #[test]
    fn test_decreasing_sequence() {
        let data = seq((1..=20).rev().map(|i| i as f64).collect());
        assert!(!IncreaseDetector::new(Side::Positive, 0.05).predict(&data).unwrap().any());
        assert!(IncreaseDetector::new(Side::Negative, 0.05).predict(&data).unwrap().any());
        assert!(IncreaseDetector::new(Side::Both, 0.05).predict(&data).unwrap().any());
    }

    #[test]
    fn test_noise_is_not_a_trend() {
        let mut rng = StdRng::seed_from_u64(42);
        let data = seq((0..100).map(|_| rng.gen_range(0.0..1.0)).collect());
        let detector = IncreaseDetector::new(Side::Both, 0.001);
        assert!(!detector.predict(&data).unwrap().any());
    }

    #[test]
    fn test_short_sequence_never_flags() {
        let detector = IncreaseDetector::default();
        assert!(!detector.predict(&seq(vec![1.0])).unwrap().any());
        assert!(detector.predict(&seq(vec![])).unwrap().is_empty());
    }
}
