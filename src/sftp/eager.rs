// ABOUTME: SFTP client over a russh session with a cached SFTP sub-channel.
// ABOUTME: Loads the key at construction and authenticates on first transfer.

use super::client::RemoteClient;
use super::error::{Error, InitError, Result, TransferError};
use super::handler::HostKeyHandler;
use super::keys::default_key_path;
use super::session_cache::{CachedSession, SessionCache, Target};
use crate::config::ClientConfig;
use crate::types::{Port, validate_host, validate_username};
use async_trait::async_trait;
use parking_lot::Mutex;
use russh::Disconnect;
use russh::client::{self, Handle};
use russh::keys::{PrivateKey, PrivateKeyWithHashAlg, load_secret_key};
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::OpenFlags;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// An authenticated SSH session with an open SFTP sub-channel.
struct Connection {
    target: Target,
    handle: Handle<HostKeyHandler>,
    sftp: SftpSession,
}

#[async_trait]
impl CachedSession for Connection {
    fn target(&self) -> &Target {
        &self.target
    }

    fn is_open(&self) -> bool {
        !self.handle.is_closed()
    }

    /// Sub-channel first, then the session.
    async fn shutdown(&self) -> std::result::Result<(), TransferError> {
        self.sftp.close().await?;
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

/// SFTP client that owns its key material and session.
///
/// Construction only loads the private key; no network traffic happens until
/// the first [`upload`](RemoteClient::upload) or
/// [`download`](RemoteClient::download). The authenticated session is then
/// kept and reused until it drops, or until a mutator points the client at a
/// different account or server.
pub struct EagerClient {
    config: Mutex<ClientConfig>,
    key: Arc<PrivateKey>,
    ssh_config: Arc<client::Config>,
    sessions: SessionCache<Connection>,
}

impl std::fmt::Debug for EagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EagerClient")
            .field("config", &*self.config.lock())
            .field("key", &"<private key>")
            .field("closed", &self.sessions.is_closed())
            .finish()
    }
}

impl EagerClient {
    /// Load the private key and prepare the transport configuration.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, InitError> {
        let key_path = match &config.key_path {
            Some(path) => path.clone(),
            None => default_key_path()?,
        };
        let key = load_secret_key(&key_path, None).map_err(|e| InitError::KeyLoadFailed {
            path: key_path.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Loaded private key from {}", key_path.display());

        let ssh_config = client::Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        Ok(Self {
            config: Mutex::new(config),
            key: Arc::new(key),
            ssh_config: Arc::new(ssh_config),
            sessions: SessionCache::new(),
        })
    }

    /// Snapshot of the settings the next session will use.
    pub fn config(&self) -> ClientConfig {
        self.config.lock().clone()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.sessions.is_closed() {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Return the cached session, or establish a new one for the current config.
    async fn session(&self) -> Result<Arc<Connection>> {
        let config = self.config();
        let username = config
            .username
            .clone()
            .ok_or(TransferError::MissingUsername)?;
        let target = Target {
            username,
            host: config.host.clone(),
            port: config.port,
        };

        self.sessions
            .get_or_connect(target, |target| self.connect(&config, target))
            .await
    }

    async fn connect(
        &self,
        config: &ClientConfig,
        target: Target,
    ) -> std::result::Result<Connection, TransferError> {
        let timeout = config.connect_timeout;
        let handler = HostKeyHandler::new(
            target.host.clone(),
            target.port,
            config.trust_on_first_use,
            config.known_hosts_path.clone(),
        );

        tracing::debug!("Connecting to {}:{}", target.host, target.port);
        let mut handle = tokio::time::timeout(
            timeout,
            client::connect(
                Arc::clone(&self.ssh_config),
                (target.host.as_str(), target.port),
                handler,
            ),
        )
        .await
        .map_err(|_| TransferError::Timeout(timeout))?
        .map_err(|e| match e {
            russh::Error::IO(e) => TransferError::Io(e),
            e => TransferError::Connection(e.to_string()),
        })?;

        let sftp = tokio::time::timeout(timeout, self.open_sftp(&mut handle, &target.username))
            .await
            .map_err(|_| TransferError::Timeout(timeout))??;

        tracing::debug!(
            "SFTP session established to {}@{}:{}",
            target.username,
            target.host,
            target.port
        );
        Ok(Connection {
            target,
            handle,
            sftp,
        })
    }

    /// Authenticate with the loaded key and start the SFTP subsystem.
    async fn open_sftp(
        &self,
        handle: &mut Handle<HostKeyHandler>,
        username: &str,
    ) -> std::result::Result<SftpSession, TransferError> {
        let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
        let result = handle
            .authenticate_publickey(
                username,
                PrivateKeyWithHashAlg::new(Arc::clone(&self.key), hash_alg),
            )
            .await?;
        if !result.success() {
            return Err(TransferError::AuthenticationFailed);
        }

        let channel = handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        Ok(SftpSession::new(channel.into_stream()).await?)
    }
}

#[async_trait]
impl RemoteClient for EagerClient {
    fn set_username(&self, username: &str) -> Result<()> {
        self.ensure_open()?;
        let username = validate_username(username)?;
        self.config.lock().username = Some(username.to_string());
        Ok(())
    }

    fn set_host(&self, host: &str) -> Result<()> {
        self.ensure_open()?;
        let host = validate_host(host)?;
        self.config.lock().host = host.to_string();
        Ok(())
    }

    fn set_port(&self, port: i32) -> Result<()> {
        self.ensure_open()?;
        let port = Port::try_from(port)?;
        self.config.lock().port = port.get();
        Ok(())
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        self.ensure_open()?;
        let contents = tokio::fs::read(local_path)
            .await
            .map_err(TransferError::from)?;
        let connection = self.session().await?;

        let mut file = connection
            .sftp
            .open_with_flags(
                remote_path,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await
            .map_err(TransferError::from)?;
        file.write_all(&contents).await.map_err(TransferError::from)?;
        file.flush().await.map_err(TransferError::from)?;
        file.shutdown().await.map_err(TransferError::from)?;

        tracing::debug!(
            "Uploaded {} bytes from {} to {}",
            contents.len(),
            local_path.display(),
            remote_path
        );
        Ok(())
    }

    async fn download(&self, remote_path: &str) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let connection = self.session().await?;

        let mut file = connection
            .sftp
            .open_with_flags(remote_path, OpenFlags::READ)
            .await
            .map_err(TransferError::from)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .await
            .map_err(TransferError::from)?;

        tracing::debug!("Downloaded {} bytes from {}", buffer.len(), remote_path);
        Ok(buffer)
    }

    async fn close(&self) -> Result<()> {
        self.sessions.close().await
    }
}
