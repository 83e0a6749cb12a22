//! Minimum evaluation length guard.

use detector_spi::{AnomalyMask, Detector, Result};
use sequence_spi::Sequence;

/// Wraps a detector so that windows shorter than `minimum_length` are
/// reported as normal without computing any statistic.
///
/// A training window below the floor leaves the inner detector unfitted and
/// every later window normal until a long enough `fit`.
pub struct MinimumLength {
    inner: Box<dyn Detector>,
    minimum_length: usize,
    fit_skipped: bool,
}

impl MinimumLength {
    pub fn new(inner: Box<dyn Detector>, minimum_length: usize) -> Self {
        Self {
            inner,
            minimum_length,
            fit_skipped: false,
        }
    }
}

impl Detector for MinimumLength {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn fit(&mut self, train: &Sequence) -> Result<()> {
        self.fit_skipped = train.len() < self.minimum_length;
        if self.fit_skipped {
            return Ok(());
        }
        self.inner.fit(train)
    }

    fn predict(&self, eval: &Sequence) -> Result<AnomalyMask> {
        if self.fit_skipped || eval.len() < self.minimum_length {
            return Ok(AnomalyMask::all_false(eval));
        }
        self.inner.predict(eval)
    }
}
