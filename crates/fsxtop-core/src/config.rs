// ── Runtime controller configuration ──
//
// These types describe *what* to monitor and how often. They never touch
// disk: the CLI builds a `ControllerConfig` from the layered config and
// hands it in.

use std::time::Duration;

use crate::error::CoreError;
use crate::model::ResourceKind;
use crate::store::ResourceFilter;

/// Default listing cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
/// Default metrics cadence.
pub const DEFAULT_METRIC_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for one controller instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Region to list and price in.
    pub region: String,
    /// Only list file systems of this type.
    pub kind_filter: Option<ResourceKind>,
    /// Case-insensitive name substring, applied while listing.
    pub name_filter: Option<String>,
    /// How often the listing refresh runs.
    pub refresh_interval: Duration,
    /// How often the metrics refresh runs.
    pub metric_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            kind_filter: None,
            name_filter: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            metric_interval: DEFAULT_METRIC_INTERVAL,
        }
    }
}

impl ControllerConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind_filter = Some(kind);
        self
    }

    #[must_use]
    pub fn with_name_filter(mut self, needle: impl Into<String>) -> Self {
        self.name_filter = Some(needle.into());
        self
    }

    #[must_use]
    pub fn with_intervals(mut self, refresh: Duration, metric: Duration) -> Self {
        self.refresh_interval = refresh;
        self.metric_interval = metric;
        self
    }

    /// The listing-time filter derived from this config.
    pub fn filter(&self) -> ResourceFilter {
        ResourceFilter {
            kind: self.kind_filter,
            name_contains: self.name_filter.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.region.trim().is_empty() {
            return Err(config_error("Region is required"));
        }
        if self.refresh_interval.is_zero() {
            return Err(config_error("refresh interval must be greater than zero"));
        }
        if self.metric_interval.is_zero() {
            return Err(config_error("metric interval must be greater than zero"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> CoreError {
    CoreError::Config {
        message: message.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_cadences() {
        let config = ControllerConfig::new("us-east-1");
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.metric_interval, Duration::from_secs(60));
        assert!(config.filter().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_region_is_rejected() {
        let err = ControllerConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("Region is required"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = ControllerConfig::new("us-east-1")
            .with_intervals(Duration::ZERO, Duration::from_secs(60));
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn filter_carries_kind_and_name() {
        let filter = ControllerConfig::new("us-east-1")
            .with_kind(ResourceKind::Ontap)
            .with_name_filter("prod")
            .filter();
        assert_eq!(filter.kind, Some(ResourceKind::Ontap));
        assert_eq!(filter.name_contains.as_deref(), Some("prod"));
    }
}
