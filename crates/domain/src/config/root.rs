use super::logging::LOG_LEVELS;
use super::{ConfigError, LoggingConfig, MetricsConfig, ServerConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub dns_port: Option<u16>,
    pub metrics_address: Option<String>,
    pub startup_timeout_secs: Option<u64>,
}

impl Config {
    /// Loads the config file (if any) and applies CLI overrides on top.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(address) = overrides.metrics_address {
            self.metrics.address = address;
        }
        if let Some(secs) = overrides.startup_timeout_secs {
            self.server.startup_timeout_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.startup_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "server.startup_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.server.probe_read_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "server.probe_read_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.server.tcp_idle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "server.tcp_idle_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let listen = self.server.listen_address();
        if listen.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server bind address '{}' is not a valid socket address",
                listen
            )));
        }

        if self.metrics.enabled && self.metrics.address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "metrics.address '{}' is not a valid socket address",
                self.metrics.address
            )));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level '{}' must be one of {:?}",
                self.logging.level, LOG_LEVELS
            )));
        }

        Ok(())
    }
}
