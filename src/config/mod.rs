//! Configuration module

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.lockitron.com";

/// Platform domain, also the default entity name
pub const DOMAIN: &str = "lockitron";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub lock: LockitronConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockitronConfig {
    pub access_token: String,
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl LockitronConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Missing("lock.access_token"));
        }
        if self.id.trim().is_empty() {
            return Err(ConfigError::Missing("lock.id"));
        }
        parse_base_url(&self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "lock.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "lock.scan_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse `lock.base_url`; only http(s) URLs that can carry a path are accepted
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: "lock.base_url",
        reason: e.to_string(),
    })?;
    check_base_url(&url)?;
    Ok(url)
}

pub fn check_base_url(url: &Url) -> Result<(), ConfigError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: "lock.base_url",
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            key: "lock.base_url",
            reason: format!("{} cannot hold a path", url),
        });
    }
    Ok(())
}

fn default_name() -> String {
    DOMAIN.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_scan_interval_secs() -> u64 {
    30
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8123
}

impl Config {
    /// Load from `config/default` (optional) overlaid by `LOCKITRON__*` env vars
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("LOCKITRON").separator("__"));

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;
        config.lock.validate()?;
        Ok(config)
    }
}
