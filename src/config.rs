//! TOML configuration file support.
//!
//! Feature extraction settings can be kept in a config file instead of being
//! assembled in code:
//!
//! ```toml
//! # pulseprep.toml
//! [features]
//! data_format = "charge_bins_and_times"
//! num_bins = 12
//! time_bins = [-500.0, 0.0, 500.0, 1000.0, 1500.0, 2000.0, 2500.0,
//!              3000.0, 3500.0, 4000.0, 4500.0]
//! relative_time_method = "waveform_quantile"
//! waveform_quantile = 0.1
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::features::{FeatureConfig, FeatureError};

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML or has wrongly typed fields
    #[error("Failed to parse TOML configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Settings parsed but are inconsistent
    #[error(transparent)]
    InvalidFeatures(#[from] FeatureError),
}

/// Root configuration structure for pulseprep.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Feature extraction settings.
    #[serde(default)]
    pub features: FeatureConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.features.validate()?;
        Ok(config)
    }
}
