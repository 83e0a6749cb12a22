//! Anomaly mask model.

use serde::{Deserialize, Serialize};

use sequence_spi::Sequence;

use crate::error::{DetectorError, Result};

/// Boolean anomaly flags aligned with the timestamps of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyMask {
    pub timestamps: Vec<i64>,
    pub flags: Vec<bool>,
}

impl AnomalyMask {
    pub fn new(timestamps: Vec<i64>, flags: Vec<bool>) -> Result<Self> {
        if timestamps.len() != flags.len() {
            return Err(DetectorError::LengthMismatch {
                left: timestamps.len(),
                right: flags.len(),
            });
        }
        Ok(Self { timestamps, flags })
    }

    /// Flags aligned with the timestamps of `sequence`.
    pub fn for_sequence(sequence: &Sequence, flags: Vec<bool>) -> Result<Self> {
        Self::new(sequence.timestamps().to_vec(), flags)
    }

    /// The same verdict for every point of `sequence`.
    pub fn uniform(sequence: &Sequence, flag: bool) -> Self {
        Self {
            timestamps: sequence.timestamps().to_vec(),
            flags: vec![flag; sequence.len()],
        }
    }

    pub fn all_false(sequence: &Sequence) -> Self {
        Self::uniform(sequence, false)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn any(&self) -> bool {
        self.flags.iter().any(|&f| f)
    }

    /// Number of flagged points
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    pub fn first_true(&self) -> Option<usize> {
        self.flags.iter().position(|&f| f)
    }

    pub fn last_true(&self) -> Option<usize> {
        self.flags.iter().rposition(|&f| f)
    }

    /// Timestamps of the flagged points
    pub fn anomalous_timestamps(&self) -> Vec<i64> {
        self.timestamps
            .iter()
            .zip(&self.flags)
            .filter(|(_, &f)| f)
            .map(|(&t, _)| t)
            .collect()
    }

    /// Pointwise AND. Masks of unequal length are rejected, never truncated.
    pub fn and(&self, other: &AnomalyMask) -> Result<Self> {
        self.combine(other, |a, b| a && b)
    }

    /// Pointwise OR, same length policy as [`AnomalyMask::and`].
    pub fn or(&self, other: &AnomalyMask) -> Result<Self> {
        self.combine(other, |a, b| a || b)
    }

    fn combine(&self, other: &AnomalyMask, op: impl Fn(bool, bool) -> bool) -> Result<Self> {
        if self.len() != other.len() {
            return Err(DetectorError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(Self {
            timestamps: self.timestamps.clone(),
            flags: self
                .flags
                .iter()
                .zip(&other.flags)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        })
    }
}
