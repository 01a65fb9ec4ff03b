// ABOUTME: Connection settings for SFTP clients.
// ABOUTME: Handles defaults, YAML parsing and humantime connect timeouts.

use crate::error::{Error, Result};
use crate::types::{validate_host, validate_username};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings used to connect and authenticate an SFTP client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Login name. Transfers fail until this is set.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bound for the TCP connect + handshake, and separately for authentication.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Private key to authenticate with. If None, `~/.ssh/id_rsa` is used.
    #[serde(default)]
    pub key_path: Option<PathBuf>,

    /// If None, uses the default ~/.ssh/known_hosts.
    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,

    /// Accept and record host keys that are not yet in known_hosts.
    #[serde(default)]
    pub trust_on_first_use: bool,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: None,
            host: default_host(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            key_path: None,
            known_hosts_path: None,
            trust_on_first_use: false,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        validate_host(&self.host).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if let Some(username) = &self.username {
            validate_username(username).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "connect_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
