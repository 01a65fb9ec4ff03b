// ABOUTME: The RemoteClient capability trait and the closed set of client variants.
// ABOUTME: Client dispatches to eager, lazy or dummy implementations.

use super::dummy::DummyClient;
use super::eager::EagerClient;
use super::error::Result;
use super::lazy::LazyClient;
use async_trait::async_trait;
use std::path::Path;

/// An SFTP client.
///
/// Clients are thread-safe and cache their authenticated session, so they
/// should be reused whenever possible. Mutators change the target of the
/// *next* session; a session already in use is left alone.
///
/// After [`close`](RemoteClient::close), every method except `close` fails
/// with [`Error::Closed`](super::Error::Closed). Repeated `close` calls are
/// no-ops.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Sets the username for the next session.
    fn set_username(&self, username: &str) -> Result<()>;

    /// Sets the host for the next session.
    fn set_host(&self, host: &str) -> Result<()>;

    /// Sets the port for the next session. Must be within 0-65535.
    fn set_port(&self, port: i32) -> Result<()>;

    /// Uploads a local file to `remote_path`, replacing any existing file.
    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<()>;

    /// Downloads the full contents of `remote_path`.
    async fn download(&self, remote_path: &str) -> Result<Vec<u8>>;

    /// Releases the session and sub-channel held by this client.
    async fn close(&self) -> Result<()>;
}

/// Client handle returned by [`ClientBuilder`](super::ClientBuilder).
#[derive(Debug)]
pub enum Client {
    Eager(EagerClient),
    Lazy(LazyClient),
    Dummy(DummyClient),
}

impl Client {
    /// Returns a client that panics on every attempt to transfer a file.
    pub fn dummy() -> Self {
        Client::Dummy(DummyClient::new())
    }

    fn inner(&self) -> &dyn RemoteClient {
        match self {
            Client::Eager(client) => client,
            Client::Lazy(client) => client,
            Client::Dummy(client) => client,
        }
    }
}

#[async_trait]
impl RemoteClient for Client {
    fn set_username(&self, username: &str) -> Result<()> {
        self.inner().set_username(username)
    }

    fn set_host(&self, host: &str) -> Result<()> {
        self.inner().set_host(host)
    }

    fn set_port(&self, port: i32) -> Result<()> {
        self.inner().set_port(port)
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        self.inner().upload(local_path, remote_path).await
    }

    async fn download(&self, remote_path: &str) -> Result<Vec<u8>> {
        self.inner().download(remote_path).await
    }

    async fn close(&self) -> Result<()> {
        self.inner().close().await
    }
}
