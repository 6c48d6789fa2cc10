//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
    source: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source: None,
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// tried in order and defaults kept when none exists.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                self.config = ConfigFile::load(path)?;
                self.source = Some(PathBuf::from(path));
                log::info!("Loaded config from {}", path);
            }
            None => match ConfigFile::load_default()? {
                Some((path, config)) => {
                    self.config = config;
                    self.source = Some(path);
                }
                None => log::info!("No config file found, using defaults"),
            },
        }

        Ok(self)
    }

    /// Override with CLI server name
    pub fn with_server_name(mut self, name: Option<String>) -> Self {
        if let Some(n) = name.filter(|n| !n.trim().is_empty()) {
            self.config.monitor.server_name = n;
        }
        self
    }

    /// File the configuration was loaded from, if any
    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
