//! Static parameter source
//!
//! A map-backed `ParamSource` loadable from JSON and overridable from the
//! environment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sequence_spi::{ParamSource, Result, SequenceError};

/// Environment prefix for parameter overrides (`ENGINE_PARAM_<NAME>`).
pub const PARAM_ENV_PREFIX: &str = "ENGINE_PARAM_";
/// Environment prefix for threshold overrides (`ENGINE_THRESHOLD_<NAME>`).
pub const THRESHOLD_ENV_PREFIX: &str = "ENGINE_THRESHOLD_";

/// Process-wide tunables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticParams {
    pub params: HashMap<String, f64>,
    pub thresholds: HashMap<String, f64>,
}

impl StaticParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"params": {...}, "thresholds": {...}}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SequenceError::InvalidParameter {
            name: "params".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_threshold(mut self, name: impl Into<String>, value: f64) -> Self {
        self.thresholds.insert(name.into(), value);
        self
    }

    /// Apply overrides from `(key, value)` pairs such as `std::env::vars()`.
    ///
    /// Keys are lower-cased after the prefix; values that do not parse are skipped.
    pub fn with_overrides<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let parsed = match value.trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(key = %key, value = %value, "ignoring non-numeric override");
                    continue;
                }
            };
            if let Some(name) = key.strip_prefix(PARAM_ENV_PREFIX) {
                self.params.insert(name.to_lowercase(), parsed);
            } else if let Some(name) = key.strip_prefix(THRESHOLD_ENV_PREFIX) {
                self.thresholds.insert(name.to_lowercase(), parsed);
            }
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        let vars = std::env::vars().filter(|(k, _)| {
            k.starts_with(PARAM_ENV_PREFIX) || k.starts_with(THRESHOLD_ENV_PREFIX)
        });
        self.with_overrides(vars)
    }
}

impl ParamSource for StaticParams {
    fn get_param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }

    fn get_threshold(&self, name: &str) -> Option<f64> {
        self.thresholds.get(name).copied()
    }
}
