// ABOUTME: Fluent builder for SFTP clients.
// ABOUTME: Produces an eagerly constructed client or a lazily constructed one.

use super::client::{Client, RemoteClient};
use super::eager::EagerClient;
use super::error::Result;
use super::lazy::LazyClient;
use crate::config::ClientConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A builder of [`Client`]s.
///
/// Defaults: host `"localhost"`, port 22, connect timeout 60 seconds, key
/// `~/.ssh/id_rsa`. The username has no default and must be set before the
/// first transfer.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn set_username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn set_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn set_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Bound for connecting to a server, and separately for authenticating.
    pub fn set_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn set_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.key_path = Some(path.into());
        self
    }

    pub fn set_known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.known_hosts_path = Some(path.into());
        self
    }

    pub fn set_trust_on_first_use(mut self, tofu: bool) -> Self {
        self.config.trust_on_first_use = tofu;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a client from the current settings.
    ///
    /// Fails with [`Error::Initialization`](super::Error::Initialization) if
    /// the private key cannot be loaded.
    pub fn build(&self) -> Result<Client> {
        let client = EagerClient::new(self.config.clone())?;
        Ok(Client::Eager(client))
    }

    /// Create a client that builds the real client on its first transfer or
    /// mutator call.
    ///
    /// Any error from building the real client is deferred to that call and
    /// returned again by every call after it. The deferred key load reads
    /// the filesystem synchronously; on a multi-threaded tokio runtime it is
    /// run through `block_in_place`.
    pub fn build_lazily(&self) -> Client {
        let config = self.config.clone();
        Client::Lazy(LazyClient::new(move || {
            let client = EagerClient::new(config)?;
            Ok(Arc::new(client) as Arc<dyn RemoteClient>)
        }))
    }
}
