//! ARIMA order model

use serde::{Deserialize, Serialize};

/// (AR length, differencing count, MA length)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of ARMA coefficients
    pub fn n_params(&self) -> usize {
        self.p + self.q
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ArimaOrder::new(2, 1, 0).to_string(), "(2, 1, 0)");
    }

    #[test]
    fn test_n_params() {
        assert_eq!(ArimaOrder::new(2, 1, 3).n_params(), 5);
    }

    #[test]
    fn test_serde() {
        let order = ArimaOrder::new(1, 0, 1);
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"{"p":1,"d":0,"q":1}"#);
    }
}
