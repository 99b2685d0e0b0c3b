//! Application configuration loaded from TOML

use anyhow::{bail, Context, Result};
use price_clean::CleanerConfig;
use price_forecast::{ArimaConfig, SarimaxConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for all three pipelines
///
/// Every section and field is optional; missing values take the defaults of
/// the individual pipeline configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cleaner: CleanerConfig,
    pub arima: ArimaConfig,
    pub sarimax: SarimaxConfig,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cleaner.layout.time_column.trim().is_empty()
            || self.cleaner.layout.price_column.trim().is_empty()
        {
            bail!("cleaner.time_column and cleaner.price_column must be set");
        }
        self.arima.validate().context("Invalid [arima] section")?;
        self.sarimax.validate().context("Invalid [sarimax] section")?;
        Ok(())
    }
}
