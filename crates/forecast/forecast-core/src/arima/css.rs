//! Conditional sum-of-squares likelihood.

use std::f64::consts::PI;

/// Innovations of `z_t = Σ φ_i z_{t-i} + e_t + Σ θ_j e_{t-j}`, conditioned
/// on zero innovations for the first `p` observations.
pub fn css_residuals(z: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut e = vec![0.0; z.len()];
    for t in p..z.len() {
        let mut value = z[t];
        for (i, phi) in ar.iter().enumerate() {
            value -= phi * z[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                value -= theta * e[t - 1 - j];
            }
        }
        e[t] = value;
    }
    e
}

/// Goodness of fit of one parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssFit {
    pub sigma2: f64,
    pub loglike: f64,
    pub bic: f64,
}

/// Gaussian log-likelihood and BIC of the CSS innovations.
///
/// The parameter count includes the innovation variance.
pub fn css_evaluate(z: &[f64], ar: &[f64], ma: &[f64]) -> CssFit {
    let n_eff = z.len().saturating_sub(ar.len());
    if n_eff == 0 {
        return CssFit {
            sigma2: f64::NAN,
            loglike: f64::NEG_INFINITY,
            bic: f64::INFINITY,
        };
    }

    let e = css_residuals(z, ar, ma);
    let sse: f64 = e[ar.len()..].iter().map(|v| v * v).sum();
    let sigma2 = (sse / n_eff as f64).max(f64::MIN_POSITIVE);
    let n = n_eff as f64;
    let loglike = -n / 2.0 * ((2.0 * PI * sigma2).ln() + 1.0);
    let k = (ar.len() + ma.len() + 1) as f64;
    let bic = -2.0 * loglike + k * n.ln();

    CssFit {
        sigma2: if sigma2.is_finite() { sigma2 } else { f64::NAN },
        loglike: if loglike.is_finite() { loglike } else { f64::NEG_INFINITY },
        bic: if bic.is_finite() { bic } else { f64::INFINITY },
    }
}
