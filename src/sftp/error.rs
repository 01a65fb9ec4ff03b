// ABOUTME: SFTP client error types.
// ABOUTME: Separates usage, initialization, transfer, closed-state and close failures.

use crate::types::UsageError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Shared so that a lazy client can hand out the same failure to every caller.
    #[error("failed to initialize SFTP client: {0}")]
    Initialization(Arc<InitError>),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("SFTP client is closed")]
    Closed,

    #[error("failed to close SFTP client: {0}")]
    Close(#[source] TransferError),
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Error::Initialization(Arc::new(e))
    }
}

/// Failure while constructing a client, before any network traffic.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("HOME is not set, cannot locate default private key")]
    HomeNotSet,

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("client construction panicked: {0}")]
    Panicked(String),
}

/// Failure while connecting, authenticating or moving file data.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("username is not set")]
    MissingUsername,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("authentication failed: key rejected")]
    AuthenticationFailed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("SFTP error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
