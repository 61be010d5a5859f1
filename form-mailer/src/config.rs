//! Configuration module.
//!
//! Provider credentials are read from a JSON file first and fall back to
//! environment variables. Server settings (port, provider API base) always
//! come from the environment.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

/// Default location of the JSON configuration file.
pub const DEFAULT_CONFIG_PATH: &str = ".config";

/// Default Mailgun API base (US region).
pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} could not be read")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid JSON")]
    FileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("$PORT must be set")]
    MissingPort,

    #[error("$PORT is not a valid port: {0}")]
    InvalidPort(String),

    #[error("MAILGUN_API_BASE is not a valid URL: {0}")]
    InvalidApiBase(String),
}

impl ConfigError {
    /// A missing config file is the expected trigger for the environment
    /// fallback, not a failure worth shouting about.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::FileRead { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Mailgun credentials and the referer allow-list.
#[derive(Clone, Default, Deserialize)]
pub struct Config {
    /// Mailgun sending domain
    #[serde(default)]
    pub domain: String,

    /// Mailgun private API key, used to send
    #[serde(default, rename = "privateAPIKey")]
    pub private_api_key: String,

    /// Mailgun public validation key
    #[serde(default, rename = "publicValidationKey")]
    pub public_validation_key: String,

    /// Fixed recipient of every relayed message
    #[serde(default, rename = "toAddress")]
    pub to_address: String,

    /// Accepted Referer header values; empty allows everything
    #[serde(default)]
    pub referers: Vec<String>,
}

// Keys stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("private_api_key", &"[redacted]")
            .field("public_validation_key", &"[redacted]")
            .field("to_address", &self.to_address)
            .field("referers", &self.referers)
            .finish()
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config =
            serde_json::from_slice(&raw).map_err(|source| ConfigError::FileParse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()
    }

    /// Load configuration from environment variables, read through `lookup`
    /// (`std::env::var` in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        Config {
            domain: var("MGDOMAIN"),
            private_api_key: var("MGPRIVATEKEY"),
            public_validation_key: var("MGPUBLICKEY"),
            to_address: var("TOADDRESS"),
            referers: parse_csv(&var("REFERERS")),
        }
        .validate()
    }

    /// Reject a configuration with any empty credential field.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let missing: Vec<&'static str> = [
            ("domain", &self.domain),
            ("privateAPIKey", &self.private_api_key),
            ("publicValidationKey", &self.public_validation_key),
            ("toAddress", &self.to_address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::MissingFields(missing))
        }
    }
}

/// One place configuration may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Env,
}

impl ConfigSource {
    /// Load from this source, resolving `Env` through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            ConfigSource::File(path) => Config::from_file(path),
            ConfigSource::Env => Config::from_lookup(lookup),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file:{}", path.display()),
            ConfigSource::Env => f.write_str("env"),
        }
    }
}

/// Walk the sources in order and keep the first configuration that loads.
///
/// Returns `None` when every source fails; mail sending is then disabled.
pub fn load(sources: &[ConfigSource]) -> Option<Config> {
    load_with(sources, |key| env::var(key).ok())
}

/// Like [`load`], with environment variables resolved through `lookup`.
pub fn load_with<F>(sources: &[ConfigSource], lookup: F) -> Option<Config>
where
    F: Fn(&str) -> Option<String>,
{
    for source in sources {
        match source.load_with(&lookup) {
            Ok(config) => {
                info!(
                    source = %source,
                    domain = %config.domain,
                    to_address = %config.to_address,
                    referer_count = config.referers.len(),
                    "config_loaded"
                );
                return Some(config);
            }
            Err(e) if e.is_not_found() => {
                info!(source = %source, "config_source_absent");
            }
            Err(e) => {
                warn!(source = %source, error = %e, "config_source_failed");
            }
        }
    }

    error!("config_unavailable_mail_disabled");
    None
}

/// Settings for the HTTP server itself.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Port for the web server to listen on
    pub port: u16,

    /// Path of the JSON configuration file
    pub config_path: PathBuf,

    /// Base URL of the Mailgun API
    pub mailgun_api_base: String,
}

impl ServerSettings {
    /// Load server settings from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_port = lookup("PORT")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingPort)?;
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw_port.clone()))?;

        let config_path = lookup("CONFIG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mailgun_api_base = match lookup("MAILGUN_API_BASE").filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidApiBase(raw.clone()))?;
                raw.trim().trim_end_matches('/').to_string()
            }
            None => DEFAULT_MAILGUN_API_BASE.to_string(),
        };

        Ok(ServerSettings {
            port,
            config_path,
            mailgun_api_base,
        })
    }

    /// Configuration sources in the order they are tried.
    pub fn config_sources(&self) -> Vec<ConfigSource> {
        vec![ConfigSource::File(self.config_path.clone()), ConfigSource::Env]
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
