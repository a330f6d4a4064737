//! API service configuration.
//!
//! This module reads the service configuration from a TOML file and applies
//! environment overrides on top of it. Every field has a default, so an empty
//! file (or no file at all) yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ERCOLE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub api_service: ApiServiceConfig,
    /// Directory holding templates and sample files.
    pub resource_file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiServiceConfig {
    pub bind_host: String,
    pub port: u16,
    /// Reject every mutating request with 403.
    pub read_only: bool,
    pub enable_inserting_custom_patching_function: bool,
    pub default_database_tag_choices: Vec<String>,
    pub debug_oracle_database_contracts_assignment_algorithm: bool,
    pub authentication_provider: AuthenticationConfig,
}

impl Default for ApiServiceConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            read_only: false,
            enable_inserting_custom_patching_function: false,
            default_database_tag_choices: Vec::new(),
            debug_oracle_database_contracts_assignment_algorithm: false,
            authentication_provider: AuthenticationConfig::default(),
        }
    }
}

/// Credentials and token settings of the basic authentication provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
    pub username: String,
    pub password: String,
    pub secret_key: String,
    pub token_validity_hours: i64,
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            username: "ercole".to_string(),
            password: "ercole".to_string(),
            secret_key: String::new(),
            token_validity_hours: default_token_validity_hours(),
        }
    }
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    11113
}

fn default_token_validity_hours() -> i64 {
    24
}

impl Configuration {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches, in order:
    /// 1. The file named by `ERCOLE_CONFIG`
    /// 2. `./ercole.toml`
    /// 3. `./config/ercole.toml`
    ///
    /// # Returns
    /// * `Ok(Some(config))` for the first file found
    /// * `Ok(None)` if no file exists
    /// * `Err(ConfigError)` if a file exists but cannot be read or parsed
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::from_file(path).map(Some);
        }

        let search_paths = [
            PathBuf::from("ercole.toml"),
            PathBuf::from("config/ercole.toml"),
        ];
        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Default location, falling back to defaults, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?.unwrap_or_default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `ERCOLE_READ_ONLY`, `HOST`, `PORT` and `ERCOLE_AUTH_SECRET`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("ERCOLE_READ_ONLY") {
            self.api_service.read_only = parse_env_bool("ERCOLE_READ_ONLY", &value)?;
        }
        if let Ok(host) = env::var("HOST") {
            self.api_service.bind_host = host;
        }
        if let Ok(value) = env::var("PORT") {
            self.api_service.port = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "PORT".to_string(),
                value,
            })?;
        }
        if let Ok(secret) = env::var("ERCOLE_AUTH_SECRET") {
            self.api_service.authentication_provider.secret_key = secret;
        }
        Ok(())
    }

    /// Feature flags published by `GET /settings/features`.
    pub fn features(&self) -> std::collections::BTreeMap<String, bool> {
        [
            (
                "enableInsertingCustomPatchingFunction",
                self.api_service.enable_inserting_custom_patching_function,
            ),
            (
                "debugOracleDatabaseContractsAssignmentAlgorithm",
                self.api_service
                    .debug_oracle_database_contracts_assignment_algorithm,
            ),
            ("readOnly", self.api_service.read_only),
        ]
        .into_iter()
        .map(|(name, enabled)| (name.to_string(), enabled))
        .collect()
    }
}

fn parse_env_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
