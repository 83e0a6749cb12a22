//! Preliminary ARMA estimates used to seed the likelihood search.

use super::transform::is_stationary_ar;

/// Sample autocovariances `γ(0..=max_lag)` of a zero-mean series.
pub fn autocovariance(z: &[f64], max_lag: usize) -> Vec<f64> {
    let n = z.len();
    if n == 0 {
        return vec![0.0; max_lag + 1];
    }
    (0..=max_lag)
        .map(|k| {
            if k >= n {
                0.0
            } else {
                (k..n).map(|i| z[i] * z[i - k]).sum::<f64>() / n as f64
            }
        })
        .collect()
}

/// Yule-Walker AR coefficients via the Durbin-Levinson recursion.
///
/// The recursion stops early (remaining coefficients zero) when the
/// prediction error variance collapses.
pub fn yule_walker(z: &[f64], order: usize) -> Vec<f64> {
    let mut phi = vec![0.0; order];
    if order == 0 {
        return phi;
    }
    let r = autocovariance(z, order);
    if r[0].abs() < 1e-12 {
        return phi;
    }

    let mut v = r[0];
    for k in 0..order {
        let mut num = r[k + 1];
        for j in 0..k {
            num -= phi[j] * r[k - j];
        }
        let a = num / v;
        let prev = phi.clone();
        phi[k] = a;
        for j in 0..k {
            phi[j] = prev[j] - a * prev[k - 1 - j];
        }
        v *= 1.0 - a * a;
        if v <= 1e-12 {
            break;
        }
    }
    phi
}

/// Ordinary least squares through the normal equations.
///
/// `None` when the design matrix is rank deficient.
pub fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let k = rows.first()?.len();
    if k == 0 || rows.len() < k {
        return None;
    }

    let mut a = vec![vec![0.0; k + 1]; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            for j in 0..k {
                a[i][j] += row[i] * row[j];
            }
            a[i][k] += row[i] * target;
        }
    }

    // Gaussian elimination with partial pivoting
    for col in 0..k {
        let pivot = (col..k).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        for i in col + 1..k {
            let factor = a[i][col] / a[col][col];
            for j in col..=k {
                a[i][j] -= factor * a[col][j];
            }
        }
    }

    let mut x = vec![0.0; k];
    for i in (0..k).rev() {
        let tail: f64 = (i + 1..k).map(|j| a[i][j] * x[j]).sum();
        x[i] = (a[i][k] - tail) / a[i][i];
    }
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Residuals of a pure AR filter; the first `phi.len()` entries are zero.
pub fn ar_residuals(z: &[f64], phi: &[f64]) -> Vec<f64> {
    let p = phi.len();
    (0..z.len())
        .map(|t| {
            if t < p {
                0.0
            } else {
                z[t] - (0..p).map(|i| phi[i] * z[t - 1 - i]).sum::<f64>()
            }
        })
        .collect()
}

fn long_ar_order(n: usize, min_order: usize) -> usize {
    ((10.0 * (n as f64).log10()) as usize)
        .max(min_order)
        .min(n / 2)
}

/// MA coefficients from the impulse response of a long AR filter.
///
/// `ψ_0 = 1`, `ψ_j = Σ φ_i ψ_{j-i}`; the first `q` weights approximate `θ`.
pub fn ma_from_long_ar(z: &[f64], q: usize) -> Vec<f64> {
    let long = long_ar_order(z.len(), q + 1);
    let phi = yule_walker(z, long);
    let mut psi = vec![0.0; q + 1];
    psi[0] = 1.0;
    for j in 1..=q {
        psi[j] = (1..=j.min(phi.len())).map(|i| phi[i - 1] * psi[j - i]).sum();
    }
    psi[1..].to_vec()
}

/// Two-stage Hannan-Rissanen estimate of an ARMA(p, q).
///
/// A long autoregression approximates the innovations, then `z_t` is
/// regressed on its own lags and the lagged innovations.
pub fn hannan_rissanen(z: &[f64], p: usize, q: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let n = z.len();
    let long = long_ar_order(n, p + q + 1);
    if long == 0 {
        return None;
    }
    let innovations = ar_residuals(z, &yule_walker(z, long));

    let start = long + q.max(p);
    if n <= start + p + q {
        return None;
    }
    let mut rows = Vec::with_capacity(n - start);
    let mut targets = Vec::with_capacity(n - start);
    for t in start..n {
        let mut row = Vec::with_capacity(p + q);
        row.extend((1..=p).map(|i| z[t - i]));
        row.extend((1..=q).map(|j| innovations[t - j]));
        rows.push(row);
        targets.push(z[t]);
    }
    let beta = least_squares(&rows, &targets)?;
    Some((beta[..p].to_vec(), beta[p..].to_vec()))
}

fn is_invertible_ma(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|c| -c).collect();
    is_stationary_ar(&negated)
}

/// Starting AR and MA coefficients for an ARMA(p, q) search.
///
/// Yule-Walker for pure AR, the long-AR impulse response for pure MA and
/// Hannan-Rissanen for mixed orders. Estimates outside the
/// stationary/invertible region fall back to Yule-Walker AR with zero MA.
pub fn start_params(z: &[f64], p: usize, q: usize) -> (Vec<f64>, Vec<f64>) {
    if q == 0 {
        return (yule_walker(z, p), Vec::new());
    }
    if p == 0 {
        let ma = ma_from_long_ar(z, q);
        if is_invertible_ma(&ma) {
            return (Vec::new(), ma);
        }
    } else if let Some((ar, ma)) = hannan_rissanen(z, p, q) {
        if is_stationary_ar(&ar) && is_invertible_ma(&ma) {
            return (ar, ma);
        }
    }
    (yule_walker(z, p), vec![0.0; q])
}
