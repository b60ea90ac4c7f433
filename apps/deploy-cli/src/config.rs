//! Distribution service configuration.
//!
//! Read from a JSON file passed on the command line:
//!
//! ```json
//! { "host": "https://svc.example", "auth_token": "...", "channel": "beta" }
//! ```
//!
//! Keys other than the ones below are ignored, so the file can be shared
//! with other build tooling.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use buildrelay_deploy::Timeouts;
use serde::Deserialize;
use url::Url;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration field `{0}` is missing or empty")]
    MissingField(&'static str),

    #[error("invalid host {0:?}: {1}")]
    InvalidHost(String, String),

    #[error("configuration field `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Where and how to publish.
///
/// Custom `Debug` implementation redacts `auth_token`.
#[derive(Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub auth_token: String,
    pub channel: String,
    /// Bound on init and commit calls, in seconds.
    pub metadata_timeout_secs: u64,
    /// Bound on each artifact upload, in seconds.
    pub transfer_timeout_secs: u64,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("auth_token", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("metadata_timeout_secs", &self.metadata_timeout_secs)
            .field("transfer_timeout_secs", &self.transfer_timeout_secs)
            .finish()
    }
}

/// On-disk shape. Every field is optional here so absence can be reported
/// by name instead of as a serde error.
#[derive(Deserialize)]
struct RawConfig {
    host: Option<String>,
    auth_token: Option<String>,
    channel: Option<String>,
    #[serde(default = "default_metadata_timeout")]
    metadata_timeout_secs: u64,
    #[serde(default = "default_transfer_timeout")]
    transfer_timeout_secs: u64,
}

fn default_metadata_timeout() -> u64 {
    Timeouts::default().metadata.as_secs()
}

fn default_transfer_timeout() -> u64 {
    Timeouts::default().transfer.as_secs()
}

impl ServiceConfig {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), config = ?config, "configuration loaded");
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        let host = required("host", raw.host)?;
        let auth_token = required("auth_token", raw.auth_token)?;
        let channel = required("channel", raw.channel)?;

        let url =
            Url::parse(&host).map_err(|e| ConfigError::InvalidHost(host.clone(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidHost(
                host,
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }

        if raw.metadata_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("metadata_timeout_secs"));
        }
        if raw.transfer_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("transfer_timeout_secs"));
        }

        Ok(Self {
            host,
            auth_token,
            channel,
            metadata_timeout_secs: raw.metadata_timeout_secs,
            transfer_timeout_secs: raw.transfer_timeout_secs,
        })
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            metadata: Duration::from_secs(self.metadata_timeout_secs),
            transfer: Duration::from_secs(self.transfer_timeout_secs),
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(field)),
    }
}
