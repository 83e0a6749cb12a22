//! Differencing and unit-root testing.

/// 5% critical value of the Dickey-Fuller test with a constant term.
pub const ADF_CRITICAL_5PCT: f64 = -2.86;

/// Series shorter than this are never differenced further.
const MIN_TEST_LENGTH: usize = 10;

/// Apply `order` first differences.
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Dickey-Fuller t statistic of `Δy_t = α + β y_{t-1} + ε`.
///
/// Degenerate regressions are mapped to the infinities: a constant series
/// is stationary, an exact fit is stationary only when `β < 0`.
pub fn adf_statistic(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 3 {
        return f64::NAN;
    }

    let y_lag = &data[..n - 1];
    let y_diff: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let n_reg = y_diff.len();

    let mean_lag: f64 = y_lag.iter().sum::<f64>() / n_reg as f64;
    let mean_diff: f64 = y_diff.iter().sum::<f64>() / n_reg as f64;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    for j in 0..n_reg {
        ss_xy += (y_lag[j] - mean_lag) * (y_diff[j] - mean_diff);
        ss_xx += (y_lag[j] - mean_lag).powi(2);
    }

    if ss_xx.abs() < 1e-10 {
        return f64::NEG_INFINITY;
    }

    let beta = ss_xy / ss_xx;
    let alpha = mean_diff - beta * mean_lag;

    let sse: f64 = (0..n_reg)
        .map(|j| (y_diff[j] - alpha - beta * y_lag[j]).powi(2))
        .sum();
    let mse = sse / (n_reg.saturating_sub(2).max(1)) as f64;
    let se_beta = (mse / ss_xx).sqrt();

    if se_beta < 1e-12 {
        return if beta < -1e-12 {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    beta / se_beta
}

/// Unit-root test at the 5% level. Short series count as stationary.
pub fn is_stationary(data: &[f64]) -> bool {
    if data.len() < MIN_TEST_LENGTH {
        return true;
    }
    adf_statistic(data) < ADF_CRITICAL_5PCT
}

/// Smallest differencing order (up to `max_d`) yielding a stationary series.
pub fn select_d(data: &[f64], max_d: usize) -> usize {
    let mut series = data.to_vec();
    for d in 0..max_d {
        if is_stationary(&series) {
            return d;
        }
        series = difference(&series, 1);
    }
    max_d
}
