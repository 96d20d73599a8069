//! Configuration loading and validation for pd-core.
//!
//! A single JSON file configures the redaction policy, the credential
//! hashing cost and the `user_data` logger. Every section is optional;
//! missing keys take their defaults.
//!
//! Resolution order: `--config` flag, then `PD_CONFIG`, then defaults.

use crate::logging::{check_logger_name, LogError, LogLevel, USER_DATA_LOGGER};
use pd_redact::{CredentialHasher, HashParams, RedactionError, RedactionPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PD_CONFIG";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] RedactionError),

    #[error("Invalid logger settings: {0}")]
    InvalidLogger(#[source] LogError),
}

/// Settings for the redacting logger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// Logger name; also the `tracing` target routed to it.
    pub name: String,
    /// Minimum level emitted.
    pub level: LogLevel,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            name: USER_DATA_LOGGER.to_string(),
            level: LogLevel::Info,
        }
    }
}

/// Full pd-core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub redaction: RedactionPolicy,
    pub credentials: HashParams,
    pub logger: LoggerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            redaction: RedactionPolicy::default(),
            credentials: HashParams::default(),
            logger: LoggerSettings::default(),
        }
    }
}

impl Config {
    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::IoError {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the config from an explicit path or `PD_CONFIG`.
    ///
    /// Defaults are used when neither is given. A path that is given but
    /// missing is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::resolve_with(explicit, env_path.as_deref())
    }

    fn resolve_with(explicit: Option<&Path>, env_path: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.or(env_path) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.redaction.validate()?;
        CredentialHasher::new(self.credentials)?;
        check_logger_name(&self.logger.name).map_err(ConfigError::InvalidLogger)?;
        Ok(())
    }
}
