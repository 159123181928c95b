//! Layered configuration for fsxtop.
//!
//! Defaults, an optional TOML file, AWS and `FSXTOP_*` environment
//! variables, then command-line overrides, merged in that order with
//! `figment`. The result is validated and translated into
//! `fsxtop_core::ControllerConfig`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use fsxtop_core::{ControllerConfig, ResourceKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Region is required")]
    MissingRegion,

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Effective settings after every layer has been merged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// AWS region to list, query and price in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Named AWS profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Default file system for the detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_id: Option<String>,
    /// Summary-view type filter (LUSTRE, WINDOWS, ONTAP, OPENZFS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_type: Option<String>,
    /// Case-insensitive name substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_filter: Option<String>,
    /// `field=asc|dsc`.
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Seconds between listing refreshes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Seconds between metric refreshes.
    #[serde(default = "default_metric_interval")]
    pub metric_interval: u64,
    /// Hide cost columns and totals.
    #[serde(default)]
    pub disable_pricing: bool,
    /// Colours for the good, ok and bad utilization bands.
    #[serde(default = "default_style")]
    pub style: String,
    /// Rows per page in table output.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            file_system_id: None,
            file_system_type: None,
            name_filter: None,
            sort: default_sort(),
            refresh_interval: default_refresh_interval(),
            metric_interval: default_metric_interval(),
            disable_pricing: false,
            style: default_style(),
            page_size: default_page_size(),
        }
    }
}

fn default_sort() -> String {
    "creation=dsc".into()
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_metric_interval() -> u64 {
    60
}

fn default_style() -> String {
    "green,yellow,red".into()
}

fn default_page_size() -> usize {
    10
}

/// Command-line values. `None` leaves the lower layers in charge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_pricing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl Config {
    /// The configured type filter, parsed.
    pub fn kind_filter(&self) -> Result<Option<ResourceKind>, ConfigError> {
        self.file_system_type
            .as_deref()
            .map(|raw| {
                ResourceKind::from_str(raw.trim()).map_err(|_| {
                    invalid(
                        "file_system_type",
                        format!("expected one of LUSTRE, WINDOWS, ONTAP, OPENZFS, got '{raw}'"),
                    )
                })
            })
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(ConfigError::MissingRegion);
        }
        if self.refresh_interval == 0 {
            return Err(invalid("refresh_interval", "must be greater than zero"));
        }
        if self.metric_interval == 0 {
            return Err(invalid("metric_interval", "must be greater than zero"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be greater than zero"));
        }
        self.kind_filter()?;
        if self.file_system_id.is_some() && self.file_system_type.is_some() {
            return Err(invalid(
                "file_system_type",
                "type filtering applies to the summary view only; drop it when a file system id is set",
            ));
        }
        Ok(())
    }

    /// Validate and translate into the runtime controller configuration.
    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        self.validate()?;
        let mut config = ControllerConfig::new(self.region.clone().unwrap_or_default())
            .with_intervals(
                Duration::from_secs(self.refresh_interval),
                Duration::from_secs(self.metric_interval),
            );
        if let Some(kind) = self.kind_filter()? {
            config = config.with_kind(kind);
        }
        if let Some(needle) = self.name_filter.as_deref().filter(|n| !n.is_empty()) {
            config = config.with_name_filter(needle);
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fsxtop", "fsxtop").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fsxtop");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The merge chain: defaults, file, AWS env, `FSXTOP_*` env, overrides.
/// Later layers win.
pub fn figment(path: &Path, overrides: &ConfigOverrides) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(aws_env("AWS_DEFAULT_REGION", "region"))
        .merge(aws_env("AWS_REGION", "region"))
        .merge(aws_env("AWS_PROFILE", "profile"))
        .merge(Env::prefixed("FSXTOP_"))
        .merge(Serialized::defaults(overrides.clone()))
}

fn aws_env(var: &'static str, key: &'static str) -> Env {
    Env::raw().only(&[var]).map(move |_| key.into())
}

/// Load from an explicit file path. The file may be absent.
pub fn load_config_from(path: &Path, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    let config: Config = figment(path, overrides).extract()?;
    Ok(config)
}

/// Load from the canonical config path.
pub fn load_config(overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    load_config_from(&config_path(), overrides)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    fn load(overrides: &ConfigOverrides) -> Config {
        load_config_from(Path::new("config.toml"), overrides).unwrap()
    }

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("AWS_REGION", "us-east-1");

            let config = load(&ConfigOverrides::default());
            assert_eq!(
                config,
                Config {
                    region: Some("us-east-1".into()),
                    ..Config::default()
                }
            );
            assert_eq!(config.sort, "creation=dsc");
            assert_eq!(config.page_size, 10);
            Ok(())
        });
    }

    #[test]
    fn cli_beats_env_beats_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "config.toml",
                r#"
                region = "us-west-2"
                sort = "name=asc"
                refresh_interval = 120
                page_size = 5
                "#,
            )?;
            jail.set_env("AWS_REGION", "eu-west-1");
            jail.set_env("FSXTOP_REFRESH_INTERVAL", "90");

            let config = load(&ConfigOverrides {
                sort: Some("capacity=dsc".into()),
                ..ConfigOverrides::default()
            });
            assert_eq!(config.region.as_deref(), Some("eu-west-1"));
            assert_eq!(config.refresh_interval, 90);
            assert_eq!(config.sort, "capacity=dsc");
            assert_eq!(config.page_size, 5);
            assert_eq!(config.metric_interval, 60);
            Ok(())
        });
    }

    #[test]
    fn region_variables_in_priority_order() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("AWS_DEFAULT_REGION", "us-east-2");
            assert_eq!(
                load(&ConfigOverrides::default()).region.as_deref(),
                Some("us-east-2")
            );

            jail.set_env("AWS_REGION", "ap-southeast-2");
            jail.set_env("AWS_PROFILE", "ops");
            let config = load(&ConfigOverrides::default());
            assert_eq!(config.region.as_deref(), Some("ap-southeast-2"));
            assert_eq!(config.profile.as_deref(), Some("ops"));

            let config = load(&ConfigOverrides {
                region: Some("eu-central-1".into()),
                ..ConfigOverrides::default()
            });
            assert_eq!(config.region.as_deref(), Some("eu-central-1"));
            Ok(())
        });
    }

    #[test]
    fn absent_override_keeps_file_value() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.toml", "disable_pricing = true\nstyle = \"blue\"")?;

            let config = load(&ConfigOverrides {
                page_size: Some(25),
                ..ConfigOverrides::default()
            });
            assert!(config.disable_pricing);
            assert_eq!(config.style, "blue");
            assert_eq!(config.page_size, 25);
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval = \"soon\"").unwrap();

        let err = load_config_from(file.path(), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
    }

    #[test]
    fn region_is_required() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRegion));
        assert_eq!(err.to_string(), "Region is required");

        let blank = Config {
            region: Some("  ".into()),
            ..Config::default()
        };
        assert!(matches!(blank.validate(), Err(ConfigError::MissingRegion)));
    }

    #[test]
    fn zero_values_are_rejected() {
        let base = Config {
            region: Some("us-east-1".into()),
            ..Config::default()
        };
        for (config, field) in [
            (
                Config {
                    refresh_interval: 0,
                    ..base.clone()
                },
                "refresh_interval",
            ),
            (
                Config {
                    metric_interval: 0,
                    ..base.clone()
                },
                "metric_interval",
            ),
            (
                Config {
                    page_size: 0,
                    ..base.clone()
                },
                "page_size",
            ),
        ] {
            match config.validate().unwrap_err() {
                ConfigError::Validation { field: f, .. } => assert_eq!(f, field),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn type_must_parse_and_excludes_id() {
        let bad_type = Config {
            region: Some("us-east-1".into()),
            file_system_type: Some("NFS".into()),
            ..Config::default()
        };
        assert!(
            bad_type
                .validate()
                .unwrap_err()
                .to_string()
                .contains("got 'NFS'")
        );

        let both = Config {
            region: Some("us-east-1".into()),
            file_system_id: Some("fs-1".into()),
            file_system_type: Some("ONTAP".into()),
            ..Config::default()
        };
        assert!(both.validate().is_err());
    }

    #[test]
    fn controller_config_carries_settings() {
        let config = Config {
            region: Some("us-west-2".into()),
            file_system_type: Some("ontap".into()),
            name_filter: Some("prod".into()),
            refresh_interval: 30,
            metric_interval: 10,
            ..Config::default()
        };
        let controller = config.controller_config().unwrap();
        assert_eq!(controller.region, "us-west-2");
        assert_eq!(controller.kind_filter, Some(ResourceKind::Ontap));
        assert_eq!(controller.name_filter.as_deref(), Some("prod"));
        assert_eq!(controller.refresh_interval, Duration::from_secs(30));
        assert_eq!(controller.metric_interval, Duration::from_secs(10));
    }

    #[test]
    fn toml_output_reloads_to_the_same_config() {
        let config = Config {
            region: Some("us-east-1".into()),
            name_filter: Some("scratch".into()),
            ..Config::default()
        };
        let rendered = config.to_toml().unwrap();
        assert!(!rendered.contains("profile"));
        let reparsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn config_path_names_the_file() {
        assert!(config_path().ends_with("config.toml"));
    }
}
