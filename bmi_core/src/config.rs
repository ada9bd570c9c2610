//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bmi/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub chart: ChartConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
        }
    }
}

/// Report export configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    /// Where per-person report folders go; defaults to `<data_dir>/reports`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Terminal chart configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("bmi")
}

fn default_database_file() -> String {
    "usuarios.db".into()
}

fn default_chart_width() -> usize {
    40
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values that would make the store or chart unusable
    pub fn validate(&self) -> Result<()> {
        if self.data.database_file.trim().is_empty() {
            return Err(Error::Config("data.database_file must not be empty".into()));
        }
        if self.chart.width == 0 {
            return Err(Error::Config("chart.width must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("bmi").join("config.toml")
    }

    /// Database file inside `data_dir`
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.data.database_file)
    }

    /// Report folder, relative to `data_dir` unless configured
    pub fn reports_dir(&self, data_dir: &Path) -> PathBuf {
        self.report
            .dir
            .clone()
            .unwrap_or_else(|| data_dir.join("reports"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
