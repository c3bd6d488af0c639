// src/config.rs

//! Connection configuration: defaults, loading from TOML or a URL, and validation.

use crate::core::QrError;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use url::Url;

/// Everything a `RespStore` needs to reach a server.
///
/// A handle built with `with_config` forwards this verbatim to its own store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sent as `AUTH username password` when set together with `password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Logical database index. `SELECT` is only sent when non-zero.
    #[serde(default)]
    pub database: u32,
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read_timeout: Duration,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7878
}
fn default_connect_timeout() -> Duration {
    Duration::from_secs(2)
}
fn default_read_timeout() -> Duration {
    Duration::from_secs(2)
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            database: 0,
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl ConnectionConfig {
    /// Loads and validates a configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: ConnectionConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses `redis://[user:password@]host[:port][/database]`.
    /// The `spineldb://` scheme is accepted as an alias. Unset parts keep their defaults.
    pub fn from_url(input: &str) -> Result<Self, QrError> {
        let url = Url::parse(input)?;
        if !matches!(url.scheme(), "redis" | "spineldb") {
            return Err(QrError::InvalidConfig(format!(
                "unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        let mut config = ConnectionConfig::default();
        if let Some(host) = url.host_str() {
            config.host = host.to_string();
        }
        if let Some(port) = url.port() {
            config.port = port;
        }
        if !url.username().is_empty() {
            config.username = Some(url.username().to_string());
        }
        config.password = url.password().map(str::to_string);

        let db = url.path().trim_start_matches('/');
        if !db.is_empty() {
            config.database = db
                .parse()
                .map_err(|_| QrError::InvalidConfig(format!("invalid database index '{db}'")))?;
        }
        Ok(config)
    }

    /// The `host:port` pair to connect to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration to ensure it can be used to connect.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(anyhow!("timeouts must be greater than zero"));
        }
        if self.username.is_some() && self.password.is_none() {
            return Err(anyhow!("username requires a password"));
        }
        Ok(())
    }
}
