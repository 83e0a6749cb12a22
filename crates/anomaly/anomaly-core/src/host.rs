//! Host matching across correlated series.

use regex::Regex;

use sequence_spi::Labels;

/// Labels that carry the host, in lookup order.
pub const HOST_LABELS: [&str; 3] = ["from_instance", "instance", "host"];

/// Host of a main series, matched with or without a port.
#[derive(Debug, Clone)]
pub struct HostPattern {
    host: String,
    regex: Regex,
}

impl HostPattern {
    pub fn new(host: impl Into<String>) -> Option<Self> {
        let host = host.into();
        if host.is_empty() {
            return None;
        }
        let regex = Regex::new(&format!(r"^{}(:\d+)?$", regex::escape(&host))).ok()?;
        Some(Self { host, regex })
    }

    /// Host part (before `:`) of the first host label present.
    pub fn from_labels(labels: &Labels) -> Option<Self> {
        let value = HOST_LABELS
            .iter()
            .find_map(|key| labels.get(*key).filter(|v| !v.is_empty()))?;
        Self::new(value.split(':').next().unwrap_or(value))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn matches_value(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// True when any host label of `labels` names this host.
    pub fn matches(&self, labels: &Labels) -> bool {
        HOST_LABELS
            .iter()
            .filter_map(|key| labels.get(*key))
            .any(|value| self.matches_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_lookup_order() {
        let pattern = HostPattern::from_labels(&labels(&[
            ("host", "db-1"),
            ("instance", "10.0.0.1:9100"),
            ("from_instance", "10.0.0.2"),
        ]))
        .unwrap();
        assert_eq!(pattern.host(), "10.0.0.2");

        let pattern = HostPattern::from_labels(&labels(&[("instance", "10.0.0.1:9100")])).unwrap();
        assert_eq!(pattern.host(), "10.0.0.1");
        assert!(HostPattern::from_labels(&labels(&[("job", "node")])).is_none());
    }

    #[test]
    fn test_port_optional() {
        let pattern = HostPattern::new("10.0.0.1").unwrap();
        assert!(pattern.matches_value("10.0.0.1"));
        assert!(pattern.matches_value("10.0.0.1:5432"));
        assert!(!pattern.matches_value("10.0.0.11"));
        assert!(!pattern.matches_value("10.0.0.1:abc"));
        // dots are literal
        assert!(!pattern.matches_value("10a0b0c1"));
    }

    #[test]
    fn test_matches_any_host_label() {
        let pattern = HostPattern::new("db-1").unwrap();
        assert!(pattern.matches(&labels(&[("instance", "other"), ("host", "db-1")])));
        assert!(!pattern.matches(&labels(&[("datname", "db-1")])));
    }
}
