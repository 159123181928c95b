//! Bridges CLI flags into the layered configuration.

use std::path::PathBuf;

use fsxtop_api::SessionConfig;
use fsxtop_config::{Config, ConfigOverrides};
use fsxtop_core::ControllerConfig;

use crate::cli::{GlobalOpts, ViewOpts};
use crate::error::CliError;

/// `--config` when given, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(fsxtop_config::config_path)
}

/// Overrides carried by the global flags alone.
pub fn global_overrides(global: &GlobalOpts) -> ConfigOverrides {
    ConfigOverrides {
        region: global.region.clone(),
        profile: global.profile.clone(),
        ..ConfigOverrides::default()
    }
}

/// Global flags plus the shared view flags.
pub fn view_overrides(global: &GlobalOpts, view: &ViewOpts) -> ConfigOverrides {
    ConfigOverrides {
        sort: view.sort.clone(),
        refresh_interval: view.refresh_interval,
        metric_interval: view.metric_interval,
        disable_pricing: view.disable_pricing.then_some(true),
        style: view.style.clone(),
        page_size: view.page_size,
        ..global_overrides(global)
    }
}

/// A merged configuration and the file it was read from.
pub struct Loaded {
    pub config: Config,
    pub path: PathBuf,
}

impl Loaded {
    pub fn load(global: &GlobalOpts, overrides: &ConfigOverrides) -> Result<Self, CliError> {
        let path = config_file(global);
        let config = fsxtop_config::load_config_from(&path, overrides)
            .map_err(|e| CliError::from_config(e, &path))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(Self { config, path })
    }

    pub fn controller_config(&self) -> Result<ControllerConfig, CliError> {
        self.config
            .controller_config()
            .map_err(|e| CliError::from_config(e, &self.path))
    }

    pub fn session(&self, controller: &ControllerConfig) -> SessionConfig {
        SessionConfig::new(controller.region.clone()).with_profile(self.config.profile.clone())
    }
}
