//! Configuration management (TOML)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub recording: RecordingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Seconds between scheduler fires. Must be at least 1.
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the sample log lives.
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            recording: RecordingConfig {
                interval_seconds: 1,
            },
            storage: StorageConfig {
                path: Self::default_storage_path(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine would refuse at startup.
    pub fn validate(&self) -> Result<()> {
        if self.recording.interval_seconds < 1 {
            return Err(Error::InvalidConfig(format!(
                "interval must be at least 1 second, got {}",
                self.recording.interval_seconds
            )));
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "resmon")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn default_storage_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "resmon")
            .map(|dirs| dirs.data_dir().join("monitoring.db"))
            .unwrap_or_else(|| PathBuf::from("monitoring.db"))
    }
}
