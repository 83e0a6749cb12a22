//! Classical additive decomposition
//!
//! Y = T + S + R, with a centred moving-average trend whose edges are
//! extrapolated by a local linear fit.

use serde::{Deserialize, Serialize};

use sequence_spi::{Result, SequenceError};

use crate::stats::linear_fit;

/// Decomposed time series components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub period: usize,
}

impl Decomposition {
    /// trend + seasonal + residual
    pub fn reconstruct(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(self.seasonal.iter())
            .zip(self.residual.iter())
            .map(|((t, s), r)| t + s + r)
            .collect()
    }
}

/// Centred moving average of width `period` (2×MA for even periods).
///
/// The first and last `period / 2` entries are `NaN`.
fn centred_moving_average(data: &[f64], period: usize) -> Vec<f64> {
    let n = data.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    let weights: Vec<f64> = if period % 2 == 1 {
        vec![1.0 / period as f64; period]
    } else {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    };

    for i in half..n.saturating_sub(half) {
        trend[i] = data[i - half..=i + half]
            .iter()
            .zip(weights.iter())
            .map(|(d, w)| d * w)
            .sum();
    }
    trend
}

/// Extrapolate the undefined trend edges with a line fitted on the nearest `span` defined points.
fn extrapolate_edges(trend: &mut [f64], half: usize, span: usize) {
    let n = trend.len();
    if half == 0 || n <= 2 * half {
        return;
    }

    let head_end = (half + span).min(n - half);
    let xs: Vec<f64> = (half..head_end).map(|i| i as f64).collect();
    if let Some(fit) = linear_fit(&xs, &trend[half..head_end]) {
        for (i, value) in trend.iter_mut().enumerate().take(half) {
            *value = fit.at(i as f64);
        }
    }

    let tail_start = (n - half).saturating_sub(span).max(half);
    let xs: Vec<f64> = (tail_start..n - half).map(|i| i as f64).collect();
    if let Some(fit) = linear_fit(&xs, &trend[tail_start..n - half]) {
        for (i, value) in trend.iter_mut().enumerate().skip(n - half) {
            *value = fit.at(i as f64);
        }
    }
}

/// Perform additive decomposition
///
/// Requires `period >= 2` and at least two full periods of data.
pub fn decompose(data: &[f64], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(SequenceError::InvalidPeriod(format!(
            "period must be at least 2, got {}",
            period
        )));
    }
    let n = data.len();
    if n < period * 2 {
        return Err(SequenceError::InsufficientData {
            required: period * 2,
            actual: n,
        });
    }

    let mut trend = centred_moving_average(data, period);
    extrapolate_edges(&mut trend, period / 2, period);

    // Detrend
    let detrended: Vec<f64> = data.iter().zip(trend.iter()).map(|(d, t)| d - t).collect();

    // Seasonal component (average by period position)
    let mut phase_means = vec![0.0; period];
    for (pos, phase_mean) in phase_means.iter_mut().enumerate() {
        let values: Vec<f64> = detrended
            .iter()
            .skip(pos)
            .step_by(period)
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if !values.is_empty() {
            *phase_mean = values.iter().sum::<f64>() / values.len() as f64;
        }
    }
    let centre = phase_means.iter().sum::<f64>() / period as f64;
    for m in phase_means.iter_mut() {
        *m -= centre;
    }
    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();

    // Residual
    let residual: Vec<f64> = data
        .iter()
        .zip(trend.iter())
        .zip(seasonal.iter())
        .map(|((d, t), s)| d - t - s)
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
        period,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_data() -> Vec<f64> {
        (0..48)
            .map(|i| 100.0 + (i as f64) * 2.0 + (i % 4) as f64 * 10.0)
            .collect()
    }

    #[test]
    fn test_additive_decomposition_shapes() {
        let data = seasonal_data();
        let result = decompose(&data, 4).unwrap();
        assert_eq!(result.trend.len(), data.len());
        assert_eq!(result.seasonal.len(), data.len());
        assert_eq!(result.residual.len(), data.len());
        assert!(result.trend.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn test_roundtrip_reconstructs_input() {
        let data = seasonal_data();
        let result = decompose(&data, 4).unwrap();
        for (orig, rec) in data.iter().zip(result.reconstruct()) {
            assert!((orig - rec).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seasonal_is_zero_centred() {
        let result = decompose(&seasonal_data(), 4).unwrap();
        let one_period: f64 = result.seasonal[..4].iter().sum();
        assert!(one_period.abs() < 1e-9);
        // phase 3 carries the largest offset
        assert!(result.seasonal[3] > result.seasonal[0]);
    }

    #[test]
    fn test_odd_period() {
        let data: Vec<f64> = (0..30).map(|i| (i % 3) as f64 + i as f64 * 0.5).collect();
        let result = decompose(&data, 3).unwrap();
        for (orig, rec) in data.iter().zip(result.reconstruct()) {
            assert!((orig - rec).abs() < 1e-9);
        }
    }

    #[test]
    fn test_short_data_rejected() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            decompose(&data, 4),
            Err(SequenceError::InsufficientData { required: 8, actual: 3 })
        ));
        assert!(matches!(decompose(&data, 1), Err(SequenceError::InvalidPeriod(_))));
    }
}
