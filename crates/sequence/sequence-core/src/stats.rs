//! Statistical primitives
//!
//! Aggregations ignore missing (`NaN`) values. Rolling windows are causal:
//! the double-rolling difference compares the window ending just before a
//! point with the window starting at it, it does not smooth.

use serde::{Deserialize, Serialize};

/// Window aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agg {
    Mean,
    Median,
    Std,
}

impl Agg {
    /// Aggregate the finite values of `window`; `NaN` when there are none.
    pub fn apply(&self, window: &[f64]) -> f64 {
        match self {
            Agg::Mean => mean(window),
            Agg::Median => median(window),
            Agg::Std => std_dev(window),
        }
    }
}

/// How the two halves of a double-rolling window are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// right - left
    Diff,
    /// |right - left|
    AbsDiff,
    /// (right - left) / |left|
    Rel,
}

/// Finite values of a slice.
pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    let data = finite(values);
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5).unwrap_or(f64::NAN)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    let data = finite(values);
    if data.is_empty() {
        return f64::NAN;
    }
    let n = data.len() as f64;
    let m = data.iter().sum::<f64>() / n;
    (data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n).sqrt()
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// Returns `None` when there is no finite value.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = finite(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Aggregate of `values[i - left ..= i + right]`, clipped at the edges.
pub fn rolling(values: &[f64], left: usize, right: usize, agg: Agg) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(left);
            let end = (i + right + 1).min(n);
            agg.apply(&values[start..end])
        })
        .collect()
}

/// Double-rolling difference.
///
/// For each index `i` the left aggregate covers `values[i - left .. i]` and
/// the right aggregate covers `values[i .. i + right]`. A window wider than
/// the series shrinks to one point. Indices where either window is
/// incomplete, or either aggregate is undefined, yield 0.
pub fn double_rolling(values: &[f64], window: (usize, usize), agg: Agg, mode: DiffMode) -> Vec<f64> {
    let n = values.len();
    let left = if n < window.0 { 1 } else { window.0.max(1) };
    let right = if n < window.1 { 1 } else { window.1.max(1) };

    (0..n)
        .map(|i| {
            if i < left || i + right > n {
                return 0.0;
            }
            let l = agg.apply(&values[i - left..i]);
            let r = agg.apply(&values[i..i + right]);
            if !l.is_finite() || !r.is_finite() {
                return 0.0;
            }
            let diff = r - l;
            match mode {
                DiffMode::Diff => diff,
                DiffMode::AbsDiff => diff.abs(),
                DiffMode::Rel => {
                    if l == 0.0 {
                        0.0
                    } else {
                        diff / l.abs()
                    }
                }
            }
        })
        .collect()
}

/// Least-squares line through `(x, y)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFitResult {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
}

impl LinearFitResult {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares on the pairs where both coordinates are finite.
///
/// `None` with fewer than two usable points or a degenerate `x` range.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFitResult> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let ss_xx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if ss_xx.abs() < 1e-12 {
        return None;
    }
    let ss_xy: f64 = pairs.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = pairs.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
    let ss_res: f64 = pairs
        .iter()
        .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
        .sum();
    let r2 = if ss_tot > 1e-10 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Some(LinearFitResult {
        slope,
        intercept,
        r2,
    })
}
