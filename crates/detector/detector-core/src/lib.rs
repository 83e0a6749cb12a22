//! Detector Core
//!
//! Implementations of every detector kind and the builder turning a
//! [`DetectorConfig`] into a boxed [`Detector`].

mod any_of;
mod binomial;
mod builder;
mod esd;
mod forecast;
mod gradient;
mod guard;
mod increase;
mod quantile;
mod shift;
mod threshold;

pub use any_of::AnyOfDetector;
pub use binomial::{binomial_half_cdf, cox_stuart, CoxStuart};
pub use builder::build;
pub use esd::{esd_critical_value, EsdTestDetector};
pub use forecast::ForecastDetector;
pub use gradient::GradientDetector;
pub use guard::MinimumLength;
pub use increase::IncreaseDetector;
pub use quantile::{IqrBounds, IqrDetector, QuantileDetector};
pub use shift::{SeasonalDetector, ShiftDetector};
pub use threshold::ThresholdDetector;

pub use detector_api::DetectorConfig;
pub use detector_spi::{AnomalyMask, Detector, DetectorError, Result};

use sequence_spi::Sequence;

/// One verdict for the whole window; missing (NaN) points stay unflagged.
pub(crate) fn window_verdict(sequence: &Sequence, flag: bool) -> AnomalyMask {
    AnomalyMask {
        timestamps: sequence.timestamps().to_vec(),
        flags: sequence.values().iter().map(|v| flag && !v.is_nan()).collect(),
    }
}

/// Pointwise verdicts; missing (NaN) points stay unflagged, infinities are
/// handed to `predicate`.
pub(crate) fn pointwise(sequence: &Sequence, predicate: impl Fn(f64) -> bool) -> AnomalyMask {
    AnomalyMask {
        timestamps: sequence.timestamps().to_vec(),
        flags: sequence
            .values()
            .iter()
            .map(|&v| !v.is_nan() && predicate(v))
            .collect(),
    }
}

/// Seconds elapsed since the first timestamp.
pub(crate) fn elapsed_seconds(timestamps: &[i64]) -> Vec<f64> {
    let start = timestamps.first().copied().unwrap_or(0);
    timestamps.iter().map(|&t| (t - start) as f64 / 1000.0).collect()
}
