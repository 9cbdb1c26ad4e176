//! Configuration loading and management.

use std::path::{Path, PathBuf};

use aoi_core::AggregateConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for input worksheets.
    pub input_dir: PathBuf,

    /// Directory receiving one table directory per worksheet.
    pub output_dir: PathBuf,

    /// Aggregation knobs, exposed as top-level config keys.
    #[serde(flatten)]
    pub aggregate: AggregateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_metrics_data"),
            output_dir: PathBuf::from("output_data"),
            aggregate: AggregateConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (AOI_*)
        figment = figment.merge(Env::prefixed("AOI_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for aoi.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aoi"))
}
