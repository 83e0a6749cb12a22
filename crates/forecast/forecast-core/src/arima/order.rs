//! ARMA estimation for a fixed order and BIC-driven order search.

use tracing::trace;

use super::css::{css_evaluate, css_residuals};
use super::estimate::start_params;
use super::optimize::{nelder_mead, NelderMeadOptions};
use super::transform::{constrain_ar, constrain_ma, unconstrain_ar, unconstrain_ma};

/// Orders tried for both `p` and `q` in the coarse search.
const ORDER_GRID: [usize; 4] = [0, 2, 4, 6];
/// Upper bound for `p` and `q` during refinement.
const MAX_ORDER: usize = 7;
/// Observations required beyond `p + q` for an order to be considered.
const MIN_DEGREES_OF_FREEDOM: usize = 10;

/// A fitted ARMA(p, q) on a zero-mean series.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmaFit {
    pub p: usize,
    pub q: usize,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub sigma2: f64,
    pub bic: f64,
    pub residuals: Vec<f64>,
}

pub fn is_feasible(n: usize, p: usize, q: usize) -> bool {
    n >= p + q + MIN_DEGREES_OF_FREEDOM
}

/// Maximise the CSS likelihood of an ARMA(p, q) over the
/// stationary/invertible region.
pub fn fit_arma(z: &[f64], p: usize, q: usize) -> ArmaFit {
    let (ar0, ma0) = start_params(z, p, q);
    let mut x0 = unconstrain_ar(&ar0);
    x0.extend(unconstrain_ma(&ma0));
    x0.iter_mut().filter(|v| !v.is_finite()).for_each(|v| *v = 0.0);

    let objective = |x: &[f64]| {
        let ar = constrain_ar(&x[..p]);
        let ma = constrain_ma(&x[p..]);
        css_evaluate(z, &ar, &ma).bic
    };
    let minimum = nelder_mead(objective, &x0, &NelderMeadOptions::default());

    let ar = constrain_ar(&minimum.x[..p]);
    let ma = constrain_ma(&minimum.x[p..]);
    let fit = css_evaluate(z, &ar, &ma);
    trace!(p, q, bic = fit.bic, iterations = minimum.iterations, "fitted ARMA candidate");

    ArmaFit {
        p,
        q,
        residuals: css_residuals(z, &ar, &ma),
        ar,
        ma,
        sigma2: fit.sigma2,
        bic: fit.bic,
    }
}

/// Pick `(p, q)` by BIC: a coarse grid, then one pass over the four
/// neighbours of the best grid point. Ties keep the earlier candidate.
pub fn select_order(z: &[f64]) -> ArmaFit {
    let n = z.len();
    let mut best: Option<ArmaFit> = None;
    let consider = |candidate: ArmaFit, best: &mut Option<ArmaFit>| {
        let better = match best {
            Some(current) => candidate.bic < current.bic,
            None => true,
        };
        if better {
            *best = Some(candidate);
        }
    };

    for &p in &ORDER_GRID {
        for &q in &ORDER_GRID {
            if is_feasible(n, p, q) {
                consider(fit_arma(z, p, q), &mut best);
            }
        }
    }

    let (bp, bq) = match &best {
        Some(fit) => (fit.p, fit.q),
        None => return fit_arma(z, 0, 0),
    };
    let neighbours = [
        (bp.checked_sub(1), Some(bq)),
        (Some(bp + 1), Some(bq)),
        (Some(bp), bq.checked_sub(1)),
        (Some(bp), Some(bq + 1)),
    ];
    for (p, q) in neighbours {
        if let (Some(p), Some(q)) = (p, q) {
            if p <= MAX_ORDER && q <= MAX_ORDER && is_feasible(n, p, q) {
                consider(fit_arma(z, p, q), &mut best);
            }
        }
    }

    best.unwrap_or_else(|| fit_arma(z, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut z = vec![0.0; n];
        for t in 1..n {
            z[t] = phi * z[t - 1] + rng.gen_range(-1.0..1.0);
        }
        z
    }

    #[test]
    fn test_fit_ar1_coefficient() {
        let z = ar1(0.6, 1000, 3);
        let fit = fit_arma(&z, 1, 0);
        assert!((fit.ar[0] - 0.6).abs() < 0.08, "{:?}", fit.ar);
        assert_eq!(fit.residuals.len(), z.len());
    }

    #[test]
    fn test_select_finds_dependence() {
        let z = ar1(0.8, 300, 5);
        let fit = select_order(&z);
        assert!(fit.p + fit.q >= 1);
    }

    #[test]
    fn test_short_series_falls_back_to_white_noise() {
        let fit = select_order(&[0.5, -0.5, 0.25, -0.25]);
        assert_eq!((fit.p, fit.q), (0, 0));
    }

    #[test]
    fn test_feasibility() {
        assert!(is_feasible(10, 0, 0));
        assert!(!is_feasible(15, 4, 2));
    }
}
