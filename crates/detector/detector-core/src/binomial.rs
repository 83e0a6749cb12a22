//! Cox-Stuart sign test with memoised binomial tables.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use statrs::function::factorial::ln_binomial;

type CdfTables = RwLock<HashMap<u64, Arc<Vec<f64>>>>;

static CDF_TABLES: OnceLock<CdfTables> = OnceLock::new();

/// `P(X <= k)` for `X ~ Binomial(n, 1/2)`.
pub fn binomial_half_cdf(n: u64, k: u64) -> f64 {
    if k >= n {
        return 1.0;
    }
    cdf_table(n)[k as usize]
}

fn cdf_table(n: u64) -> Arc<Vec<f64>> {
    let tables = CDF_TABLES.get_or_init(Default::default);
    if let Ok(guard) = tables.read() {
        if let Some(table) = guard.get(&n) {
            return Arc::clone(table);
        }
    }

    let log_total = n as f64 * std::f64::consts::LN_2;
    let mut cumulative = 0.0;
    let table: Arc<Vec<f64>> = Arc::new(
        (0..=n)
            .map(|k| {
                cumulative += (ln_binomial(n, k) - log_total).exp();
                cumulative.min(1.0)
            })
            .collect(),
    );

    if let Ok(mut guard) = tables.write() {
        guard.entry(n).or_insert_with(|| Arc::clone(&table));
    }
    table
}

/// Outcome of the Cox-Stuart trend test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoxStuart {
    /// Pairs whose later member is larger
    pub positive: u64,
    /// Pairs whose later member is smaller
    pub negative: u64,
    /// One-sided p-value for an increasing trend
    pub p_increase: f64,
    /// One-sided p-value for a decreasing trend
    pub p_decrease: f64,
}

/// Pair each value of the first half with its counterpart in the second
/// half and count the signs of the differences. Ties are discarded.
pub fn cox_stuart(values: &[f64]) -> CoxStuart {
    let n = values.len();
    let offset = n.div_ceil(2);
    let mut positive = 0u64;
    let mut negative = 0u64;
    for i in 0..n - offset {
        let diff = values[i + offset] - values[i];
        if diff > 0.0 {
            positive += 1;
        } else if diff < 0.0 {
            negative += 1;
        }
    }

    let m = positive + negative;
    if m == 0 {
        return CoxStuart {
            positive,
            negative,
            p_increase: 1.0,
            p_decrease: 1.0,
        };
    }
    CoxStuart {
        positive,
        negative,
        p_increase: binomial_half_cdf(m, negative),
        p_decrease: binomial_half_cdf(m, positive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_values() {
        assert!((binomial_half_cdf(5, 0) - 1.0 / 32.0).abs() < 1e-12);
        assert!((binomial_half_cdf(4, 2) - 11.0 / 16.0).abs() < 1e-12);
        assert_eq!(binomial_half_cdf(3, 3), 1.0);
    }

    #[test]
    fn test_cdf_is_cached() {
        let first = cdf_table(17);
        let second = cdf_table(17);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_increasing_series() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let result = cox_stuart(&values);
        assert_eq!(result.positive, 5);
        assert_eq!(result.negative, 0);
        assert!((result.p_increase - 0.03125).abs() < 1e-12);
        assert_eq!(result.p_decrease, 1.0);
    }

    #[test]
    fn test_odd_length_and_ties() {
        let result = cox_stuart(&[1.0, 1.0, 7.0, 1.0, 2.0]);
        // pairs (0,3) tie and (1,4) positive
        assert_eq!(result.positive, 1);
        assert_eq!(result.negative, 0);
    }

    #[test]
    fn test_constant_series() {
        let result = cox_stuart(&[3.0; 8]);
        assert_eq!(result.p_increase, 1.0);
        assert_eq!(result.p_decrease, 1.0);
    }

    #[test]
    fn test_empty() {
        let result = cox_stuart(&[]);
        assert_eq!(result.positive + result.negative, 0);
    }
}
