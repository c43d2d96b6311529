use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::TaskType;
use crate::scheduler::SchedulerOptions;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub default_alarm_before: u32,
    #[serde(default)]
    pub default_task_type: TaskType,
    #[serde(default)]
    pub check_conflicts_on_update: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_alarm_before: 0,
            default_task_type: TaskType::default(),
            check_conflicts_on_update: false,
            log_filter: default_log_filter(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    /// No file existed; defaults were written to this path
    WroteDefaults(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config file, or create default if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<(Self, ConfigOrigin), ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let (mut config, origin) = Self::load_or_init(&config_path)?;

        // Ensure database path matches profile (in case config was manually edited)
        config.database_path = Self::default_database_path_for_profile(profile);
        Ok((config, origin))
    }

    /// Load configuration from an explicit file, writing defaults there if it does not exist
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        Self::load_or_init(config_path).map(|(config, _)| config)
    }

    /// Like `load_from_path`, also reporting whether the file had to be created
    pub fn load_or_init(config_path: &Path) -> Result<(Self, ConfigOrigin), ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok((config, ConfigOrigin::File))
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            Ok((config, ConfigOrigin::WroteDefaults(config_path.to_path_buf())))
        }
    }

    /// Save configuration to the profile's config file
    pub fn save_with_profile(&mut self, profile: utils::Profile) -> Result<(), ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to an explicit file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("dayplan.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/dayplan-dev/dayplan.db".to_string(),
                utils::Profile::Prod => "~/.local/share/dayplan/dayplan.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            check_conflicts_on_update: self.check_conflicts_on_update,
        }
    }
}
