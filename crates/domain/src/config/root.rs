use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::probe::ProbeConfig;
use crate::probe_size::{ProbeSize, IPV6_MIN_MTU};

const LOCAL_CONFIG_PATH: &str = "qrewrite.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/qrewrite/config.toml";

/// Main configuration structure for qrewrite
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Per-family probe sizes for the marker size field
    pub probe: ProbeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. qrewrite.toml in current directory
    /// 3. /etc/qrewrite/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(size) = overrides.ipv4_probe_size {
            self.probe.ipv4_probe_size = size;
        }
        if let Some(size) = overrides.ipv6_probe_size {
            self.probe.ipv6_probe_size = size;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    ///
    /// Four-digit range checks already happen when a `ProbeSize` is built;
    /// this adds the cross-field rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.ipv6_probe_size.get() < IPV6_MIN_MTU {
            return Err(ConfigError::Validation(format!(
                "IPv6 probe size {} is below the IPv6 minimum MTU of {}",
                self.probe.ipv6_probe_size, IPV6_MIN_MTU
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("Log level cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|p| std::path::Path::new(p).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub ipv4_probe_size: Option<ProbeSize>,
    pub ipv6_probe_size: Option<ProbeSize>,
    pub log_level: Option<String>,
}
