//! Seasonality detection
//!
//! Autocorrelation-based period detection on a detrended series.

use serde::{Deserialize, Serialize};

use crate::stats::{self, Agg};

/// Parameters of the period search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityConfig {
    /// Moving-average window used for detrending. `None` uses a quarter of the series.
    pub detrend_window: Option<usize>,
    /// Minimum autocorrelation of a qualifying peak
    pub high_ac_threshold: f64,
    /// Minimum number of qualifying peaks
    pub min_seasonal_freq: usize,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            detrend_window: None,
            high_ac_threshold: 0.1,
            min_seasonal_freq: 2,
        }
    }
}

/// Compute autocorrelation function for a time series
pub fn autocorrelation(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }
    let mean: f64 = data.iter().sum::<f64>() / n as f64;
    let var: f64 = data.iter().map(|x| (x - mean).powi(2)).sum();

    if var == 0.0 {
        return vec![1.0; max_lag.min(n - 1) + 1];
    }

    (0..=max_lag.min(n - 1))
        .map(|lag| {
            if lag == 0 {
                1.0
            } else {
                data.iter()
                    .take(n - lag)
                    .zip(data.iter().skip(lag))
                    .map(|(a, b)| (a - mean) * (b - mean))
                    .sum::<f64>()
                    / var
            }
        })
        .collect()
}

/// Remove a centred moving-average trend.
pub fn detrend(data: &[f64], window: usize) -> Vec<f64> {
    let half = window.max(1) / 2;
    let trend = stats::rolling(data, half, half, Agg::Mean);
    data.iter().zip(trend.iter()).map(|(d, t)| d - t).collect()
}

/// Detect the dominant seasonal period.
///
/// The search starts after the first local minimum of the ACF and only
/// looks at lags below half the series length. The series counts as
/// seasonal when at least `min_seasonal_freq` local maxima exceed
/// `high_ac_threshold`; the period is the strongest of them.
pub fn detect_period(data: &[f64], config: &SeasonalityConfig) -> Option<usize> {
    let n = data.len();
    if n < 8 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let window = config.detrend_window.unwrap_or(n / 4).max(3);
    let detrended = detrend(data, window);
    let max_lag = n / 2;
    let acf = autocorrelation(&detrended, max_lag);
    if acf.len() < 3 || acf.iter().all(|&a| a == 1.0) {
        return None;
    }

    let lower = (1..acf.len() - 1).find(|&k| acf[k] < acf[k - 1] && acf[k] <= acf[k + 1])?;

    let peaks: Vec<usize> = ((lower + 1)..acf.len() - 1)
        .filter(|&k| {
            acf[k] > config.high_ac_threshold && acf[k] > acf[k - 1] && acf[k] >= acf[k + 1]
        })
        .collect();

    if peaks.len() < config.min_seasonal_freq.max(1) {
        return None;
    }

    let mut best = peaks[0];
    for &k in &peaks[1..] {
        if acf[k] > acf[best] {
            best = k;
        }
    }
    Some(best)
}

/// Convenience wrapper returning `(is_seasonal, period)`.
pub fn is_seasonal_series(data: &[f64], high_ac_threshold: f64, min_seasonal_freq: usize) -> (bool, Option<usize>) {
    let config = SeasonalityConfig {
        high_ac_threshold,
        min_seasonal_freq,
        ..SeasonalityConfig::default()
    };
    let period = detect_period(data, &config);
    (period.is_some(), period)
}
