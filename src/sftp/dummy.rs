// ABOUTME: Placeholder client for disabled or unconfigured SFTP access.
// ABOUTME: Accepts configuration but panics on any transfer attempt.

use super::client::RemoteClient;
use super::error::{Error, Result};
use crate::types::{Port, validate_host, validate_username};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct DummyClient {
    closed: AtomicBool,
}

impl DummyClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteClient for DummyClient {
    fn set_username(&self, username: &str) -> Result<()> {
        self.ensure_open()?;
        validate_username(username)?;
        Ok(())
    }

    fn set_host(&self, host: &str) -> Result<()> {
        self.ensure_open()?;
        validate_host(host)?;
        Ok(())
    }

    fn set_port(&self, port: i32) -> Result<()> {
        self.ensure_open()?;
        Port::try_from(port)?;
        Ok(())
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        self.ensure_open()?;
        unreachable!(
            "dummy SFTP client asked to upload {} to {}",
            local_path.display(),
            remote_path
        )
    }

    async fn download(&self, remote_path: &str) -> Result<Vec<u8>> {
        self.ensure_open()?;
        unreachable!("dummy SFTP client asked to download {}", remote_path)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
