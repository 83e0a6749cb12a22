//! Generalized extreme studentized deviate test.

use statrs::distribution::{ContinuousCDF, StudentsT};

use detector_api::EsdTestConfig;
use detector_spi::{AnomalyMask, Detector, DetectorError, Result};
use sequence_core::stats;
use sequence_spi::Sequence;

/// Critical value `lambda` of the ESD test for a sample of size `n`.
///
/// `None` when `n < 3`, where the Student-t quantile is undefined.
pub fn esd_critical_value(n: usize, alpha: f64) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let df = (n - 2) as f64;
    let p = 1.0 - alpha / (2.0 * n as f64);
    let t = StudentsT::new(0.0, 1.0, df).ok()?.inverse_cdf(p);
    let n = n as f64;
    Some((n - 1.0) * t / ((df + t * t) * n).sqrt())
}

/// Sufficient statistics of the retained training values.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Retained {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Retained {
    fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            sum: values.iter().sum(),
            sum_sq: values.iter().map(|v| v * v).sum(),
        }
    }
}

/// ESD outlier test.
///
/// `fit` strips up to `max_outliers_ratio` of the training points with the
/// iterative generalized ESD procedure and keeps the sufficient statistics
/// of the rest. `predict` adds each evaluation value to the retained sample
/// and flags it when it is the extreme deviate of that sample.
#[derive(Debug, Clone)]
pub struct EsdTestDetector {
    alpha: f64,
    max_outliers_ratio: f64,
    retained: Option<Retained>,
    removed: usize,
}

impl EsdTestDetector {
    pub fn new(alpha: f64, max_outliers_ratio: f64) -> Self {
        Self {
            alpha,
            max_outliers_ratio,
            retained: None,
            removed: 0,
        }
    }

    pub fn from_config(config: &EsdTestConfig) -> Self {
        Self::new(config.alpha, config.max_outliers_ratio)
    }

    /// Number of training points removed as outliers by the last fit.
    pub fn removed(&self) -> usize {
        self.removed
    }

    fn is_outlier(&self, retained: &Retained, value: f64) -> bool {
        if value.is_infinite() {
            return true;
        }
        let n = retained.count + 1;
        let nf = n as f64;
        let mean = (retained.sum + value) / nf;
        let variance = (retained.sum_sq + value * value - nf * mean * mean) / (nf - 1.0);
        if variance <= 0.0 {
            return false;
        }
        let statistic = (value - mean).abs() / variance.sqrt();
        match esd_critical_value(n, self.alpha) {
            Some(lambda) => statistic > lambda,
            None => false,
        }
    }
}

impl Default for EsdTestDetector {
    fn default() -> Self {
        Self::from_config(&EsdTestConfig::default())
    }
}

impl Detector for EsdTestDetector {
    fn name(&self) -> &'static str {
        "esd_test"
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        let mut values = stats::finite(train.values());
        if values.len() < 3 {
            return Err(DetectorError::InsufficientData {
                required: 3,
                actual: values.len(),
            });
        }

        let max_outliers = (values.len() as f64 * self.max_outliers_ratio).floor() as usize;
        let mut removed = 0;
        while removed < max_outliers && values.len() >= 3 {
            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt();
            if std == 0.0 {
                break;
            }

            let mut extreme = 0;
            for (i, v) in values.iter().enumerate() {
                if (v - mean).abs() > (values[extreme] - mean).abs() {
                    extreme = i;
                }
            }
            let statistic = (values[extreme] - mean).abs() / std;
            match esd_critical_value(n, self.alpha) {
                Some(lambda) if statistic > lambda => {
                    values.swap_remove(extreme);
                    removed += 1;
                }
                _ => break,
            }
        }

        tracing::debug!(removed, retained = values.len(), "esd fit");
        self.removed = removed;
        self.retained = Some(Retained::from_values(&values));
        Ok(())
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        let retained = self.retained.ok_or(DetectorError::NotFitted)?;
        Ok(crate::pointwise(eval, |v| self.is_outlier(&retained, v)))
    }
}
