//! Detector contract

use sequence_spi::Sequence;

use crate::error::Result;
use crate::model::AnomalyMask;

/// Common trait for all anomaly detectors.
///
/// `fit` computes the detector state from a training window; `predict`
/// reuses it on any number of evaluation windows. Missing (`NaN`) points
/// are never flagged.
pub trait Detector: Send + Sync {
    /// Short identifier of the detector kind
    fn name(&self) -> &'static str;

    /// Fit the detector to a training window
    fn fit(&mut self, train: &Sequence) -> Result<()>;

    /// Flag anomalous points of an evaluation window
    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask>;

    /// Fit on `sequence`, then predict on it
    fn fit_predict(&mut self, sequence: &Sequence) -> Result<AnomalyMask> {
        self.fit(sequence)?;
        self.predict(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectorError;

    /// Flags every point above the training maximum.
    struct MaxDetector {
        max: Option<f64>,
    }

    impl Detector for MaxDetector {
        fn name(&self) -> &'static str {
            "max"
        }

        fn fit(&mut self, train: &Sequence) -> Result<()> {
            self.max = train.values().iter().copied().filter(|v| v.is_finite()).reduce(f64::max);
            if self.max.is_none() {
                return Err(DetectorError::InsufficientData { required: 1, actual: 0 });
            }
            Ok(())
        }

        fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
            let max = self.max.ok_or(DetectorError::NotFitted)?;
            let flags = eval.values().iter().map(|&v| v > max).collect();
            AnomalyMask::for_sequence(eval, flags)
        }
    }

    #[test]
    fn test_predict_before_fit() {
        let detector = MaxDetector { max: None };
        let seq = Sequence::from_values(0, 1, vec![1.0]);
        assert!(matches!(detector.predict(&seq), Err(DetectorError::NotFitted)));
    }

    #[test]
    fn test_fit_then_predict_other_window() {
        let mut detector = MaxDetector { max: None };
        detector.fit(&Sequence::from_values(0, 1, vec![1.0, 3.0, 2.0])).unwrap();
        let mask = detector.predict(&Sequence::from_values(3, 1, vec![2.0, 4.0])).unwrap();
        assert_eq!(mask.flags, vec![false, true]);
    }

    #[test]
    fn test_default_fit_predict() {
        let mut detector = MaxDetector { max: None };
        let mask = detector.fit_predict(&Sequence::from_values(0, 1, vec![1.0, 2.0])).unwrap();
        assert!(!mask.any());
    }

    #[test]
    fn test_trait_object() {
        let detectors: Vec<Box<dyn Detector>> = vec![Box::new(MaxDetector { max: None })];
        assert_eq!(detectors[0].name(), "max");
    }
}
