//! Configuration file loading
//!
//! Handles loading configuration from TOML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    ///
    /// A file that exists but cannot be parsed is an error; no file at all
    /// yields `Ok(None)`.
    pub fn load_default() -> Result<Option<(PathBuf, Config)>, ConfigError> {
        for path in Self::default_paths() {
            if path.is_file() {
                let config = Self::load(&path)?;
                log::info!("Loaded config from {}", path.display());
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }

    /// Get default configuration file paths
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System-wide config
        paths.push(PathBuf::from("/etc/sysmon/config.toml"));

        // User config
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sysmon").join("config.toml"));
        }

        // Current directory
        paths.push(PathBuf::from("sysmon.toml"));

        paths
    }

    /// Render a configuration back to TOML
    pub fn to_toml(config: &Config) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
