//! Reparameterisation keeping AR polynomials stationary and MA
//! polynomials invertible.
//!
//! Unconstrained values map to partial autocorrelations in (-1, 1), which
//! the Durbin-Levinson recursion turns into polynomial coefficients.

const PACF_LIMIT: f64 = 0.999;

/// Polynomial coefficients from partial autocorrelations.
fn coefficients_from_pacf(pacf: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(pacf.len());
    for (k, &a) in pacf.iter().enumerate() {
        let mut next: Vec<f64> = (0..k).map(|j| phi[j] - a * phi[k - 1 - j]).collect();
        next.push(a);
        phi = next;
    }
    phi
}

/// Partial autocorrelations from polynomial coefficients (inverse recursion).
fn pacf_from_coefficients(coefficients: &[f64]) -> Vec<f64> {
    let mut phi = coefficients.to_vec();
    let mut pacf = vec![0.0; phi.len()];
    for k in (0..phi.len()).rev() {
        let a = phi[k].clamp(-PACF_LIMIT, PACF_LIMIT);
        pacf[k] = a;
        let scale = 1.0 - a * a;
        phi = (0..k).map(|j| (phi[j] + a * phi[k - 1 - j]) / scale).collect();
    }
    pacf
}

/// Stationary AR coefficients from unconstrained values (`tanh` map).
pub fn constrain_ar(unconstrained: &[f64]) -> Vec<f64> {
    let pacf: Vec<f64> = unconstrained.iter().map(|x| x.tanh()).collect();
    coefficients_from_pacf(&pacf)
}

pub fn unconstrain_ar(coefficients: &[f64]) -> Vec<f64> {
    pacf_from_coefficients(coefficients)
        .iter()
        .map(|r| r.atanh())
        .collect()
}

/// Invertible MA coefficients from unconstrained values (logistic map).
pub fn constrain_ma(unconstrained: &[f64]) -> Vec<f64> {
    let pacf: Vec<f64> = unconstrained
        .iter()
        .map(|x| 2.0 / (1.0 + (-x).exp()) - 1.0)
        .collect();
    coefficients_from_pacf(&pacf).iter().map(|c| -c).collect()
}

pub fn unconstrain_ma(coefficients: &[f64]) -> Vec<f64> {
    let negated: Vec<f64> = coefficients.iter().map(|c| -c).collect();
    pacf_from_coefficients(&negated)
        .iter()
        .map(|r| ((1.0 + r) / (1.0 - r)).ln())
        .collect()
}

/// True when every partial autocorrelation lies strictly inside the unit interval.
pub fn is_stationary_ar(coefficients: &[f64]) -> bool {
    let mut phi = coefficients.to_vec();
    for k in (0..phi.len()).rev() {
        let a = phi[k];
        if !a.is_finite() || a.abs() >= 1.0 {
            return false;
        }
        let scale = 1.0 - a * a;
        phi = (0..k).map(|j| (phi[j] + a * phi[k - 1 - j]) / scale).collect();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_ar_roundtrip() {
        let x = vec![0.3, -1.2, 0.8];
        assert_close(&unconstrain_ar(&constrain_ar(&x)), &x);
    }

    #[test]
    fn test_ma_roundtrip() {
        let x = vec![-0.4, 1.5];
        assert_close(&unconstrain_ma(&constrain_ma(&x)), &x);
    }

    #[test]
    fn test_single_coefficient() {
        let phi = constrain_ar(&[0.5]);
        assert!((phi[0] - 0.5f64.tanh()).abs() < 1e-12);
        let theta = constrain_ma(&[0.0]);
        assert_eq!(theta, vec![-0.0]);
    }

    #[test]
    fn test_constrained_values_are_stationary() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let x: Vec<f64> = (0..4).map(|_| rng.gen_range(-5.0..5.0)).collect();
            assert!(is_stationary_ar(&constrain_ar(&x)));
            let theta = constrain_ma(&x);
            let negated: Vec<f64> = theta.iter().map(|c| -c).collect();
            assert!(is_stationary_ar(&negated));
        }
    }

    #[test]
    fn test_explosive_ar_detected() {
        assert!(!is_stationary_ar(&[1.2]));
        assert!(is_stationary_ar(&[0.5, 0.3]));
        // inverse clamps instead of diverging
        assert!(unconstrain_ar(&[1.2]).iter().all(|v| v.is_finite()));
    }
}
