//! OR-composition of detectors.

use detector_spi::{AnomalyMask, Detector, Result};
use sequence_spi::Sequence;

/// Flags a point when any nested detector flags it.
pub struct AnyOfDetector {
    detectors: Vec<Box<dyn Detector>>,
}

impl AnyOfDetector {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Detector for AnyOfDetector {
    fn name(&self) -> &'static str {
        "any_of"
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        self.detectors.iter_mut().try_for_each(|d| d.fit(train))
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let mut mask = AnomalyMask::all_false(eval);
        for detector in &self.detectors {
            mask = mask.or(&detector.predict(eval)?)?;
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IncreaseDetector, ThresholdDetector};
    use detector_api::Side;

    #[test]
    fn test_union_of_flags() {
        let mut detector = AnyOfDetector::new(vec![
            Box::new(ThresholdDetector::new(Some(10.0), None)),
            Box::new(ThresholdDetector::new(None, Some(0.0))),
        ]);
        let seq = Sequence::from_values(0, 1000, vec![5.0, 12.0, -1.0]);
        let mask = detector.fit_predict(&seq).unwrap();
        assert_eq!(mask.flags, vec![false, true, true]);
    }

    #[test]
    fn test_window_verdict_propagates() {
        let mut detector = AnyOfDetector::new(vec![
            Box::new(ThresholdDetector::new(Some(100.0), None)),
            Box::new(IncreaseDetector::new(Side::Positive, 0.05)),
        ]);
        let seq = Sequence::from_values(0, 1000, (1..=10).map(|i| i as f64).collect());
        assert_eq!(detector.fit_predict(&seq).unwrap().count(), 10);
        assert_eq!(detector.len(), 2);
    }
}
