/*!
 * Configuration support for the dashboard library
 *
 * Provides runtime configuration options for customizing loading behavior.
 */

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// Configuration for loading and presenting the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Path to the patient records CSV
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Whether to show a progress bar while loading
    #[serde(default = "default_enable_progress_bar")]
    pub enable_progress_bar: bool,

    /// Whether to drop rows with a malformed age or empty category instead of
    /// keeping them. Malformed admission dates always fail the load.
    #[serde(default)]
    pub skip_invalid_records: bool,

    /// Accepted admission date formats, tried in order (chrono syntax)
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// Step of the billing ceiling slider
    #[serde(default = "default_slider_step")]
    pub slider_step: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            enable_progress_bar: default_enable_progress_bar(),
            skip_invalid_records: false,
            date_formats: default_date_formats(),
            slider_step: default_slider_step(),
        }
    }
}

// Default value functions for serde
fn default_data_path() -> PathBuf {
    PathBuf::from(crate::constants::DEFAULT_DATA_PATH)
}

fn default_enable_progress_bar() -> bool {
    true
}

fn default_date_formats() -> Vec<String> {
    crate::constants::DEFAULT_DATE_FORMATS
        .iter()
        .map(|f| f.to_string())
        .collect()
}

fn default_slider_step() -> f64 {
    crate::constants::DEFAULT_SLIDER_STEP
}

impl DashboardConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `CAREDASH_DATA_PATH`: path to the CSV file
    /// - `CAREDASH_PROGRESS_BAR`: "true" or "false"
    /// - `CAREDASH_SKIP_INVALID`: "true" or "false"
    /// - `CAREDASH_DATE_FORMATS`: comma separated chrono formats
    /// - `CAREDASH_SLIDER_STEP`: positive number
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CAREDASH_DATA_PATH") {
            config.data_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("CAREDASH_PROGRESS_BAR") {
            config.enable_progress_bar = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("CAREDASH_SKIP_INVALID") {
            config.skip_invalid_records = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("CAREDASH_DATE_FORMATS") {
            let formats: Vec<String> = val
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            if !formats.is_empty() {
                config.date_formats = formats;
            }
        }

        if let Ok(val) = std::env::var("CAREDASH_SLIDER_STEP") {
            if let Ok(step) = val.parse::<f64>() {
                if step > 0.0 {
                    config.slider_step = step;
                }
            }
        }

        config
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| crate::DashboardError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::DashboardError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings the loader cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.date_formats.is_empty() {
            return Err(crate::DashboardError::Configuration {
                message: "date_formats must not be empty".to_string(),
                suggestion: Some("Add at least one format such as \"%Y-%m-%d\"".to_string()),
            });
        }
        if !(self.slider_step.is_finite() && self.slider_step > 0.0) {
            return Err(crate::DashboardError::Configuration {
                message: format!("slider_step must be a positive number, got {}", self.slider_step),
                suggestion: None,
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/caredash/config.toml` on Unix-like systems
    /// or `%APPDATA%\caredash\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "caredash")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location, environment, or defaults
    ///
    /// Priority order:
    /// 1. Default config file (if exists)
    /// 2. Environment variables
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(config_path) = Self::default_config_path() {
            if config_path.exists() {
                match Self::from_file(&config_path) {
                    Ok(config) => return config,
                    Err(e) => log::warn!(
                        "Ignoring config file {}: {}",
                        config_path.display(),
                        e
                    ),
                }
            }
        }

        Self::from_env()
    }
}

/// Builder for customizing configuration
#[derive(Default)]
pub struct ConfigBuilder {
    config: DashboardConfig,
}

impl ConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CSV path
    pub fn data_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.data_path = path.as_ref().to_path_buf();
        self
    }

    /// Set progress bar enabled
    pub fn progress_bar(mut self, enabled: bool) -> Self {
        self.config.enable_progress_bar = enabled;
        self
    }

    /// Set skip invalid records
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.config.skip_invalid_records = skip;
        self
    }

    /// Replace the accepted date formats
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Set the billing slider step
    pub fn slider_step(mut self, step: f64) -> Self {
        self.config.slider_step = step;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DashboardConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DashboardConfig::default();
        assert!(config.enable_progress_bar);
        assert!(!config.skip_invalid_records);
        assert_eq!(config.slider_step, 100.0);
        assert_eq!(config.date_formats[0], "%Y-%m-%d");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .data_path("data/records.csv")
            .progress_bar(false)
            .skip_invalid_records(true)
            .date_formats(["%d.%m.%Y"])
            .slider_step(250.0)
            .build();

        assert_eq!(config.data_path, PathBuf::from("data/records.csv"));
        assert!(!config.enable_progress_bar);
        assert!(config.skip_invalid_records);
        assert_eq!(config.date_formats, vec!["%d.%m.%Y".to_string()]);
        assert_eq!(config.slider_step, 250.0);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = ConfigBuilder::new().skip_invalid_records(true).build();
        config.save(&path).unwrap();
        assert_eq!(DashboardConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_path = \"other.csv\"\n").unwrap();
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.slider_step, 100.0);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let config = ConfigBuilder::new().slider_step(0.0).build();
        assert!(matches!(
            config.validate(),
            Err(crate::DashboardError::Configuration { .. })
        ));
    }
}
