//! Dynamic configuration contract.

/// Resolves tunable numeric thresholds from process-wide configuration.
///
/// Detectors never hardcode a threshold owned by another component; they
/// ask a `ParamSource` and fall back to a typed default.
pub trait ParamSource: Send + Sync {
    /// Look up a tunable parameter.
    fn get_param(&self, name: &str) -> Option<f64>;

    /// Look up an alarm threshold.
    fn get_threshold(&self, name: &str) -> Option<f64>;

    /// Parameter with a default.
    fn param_or(&self, name: &str, default: f64) -> f64 {
        self.get_param(name).unwrap_or(default)
    }

    /// Threshold with a default.
    fn threshold_or(&self, name: &str, default: f64) -> f64 {
        self.get_threshold(name).unwrap_or(default)
    }
}
