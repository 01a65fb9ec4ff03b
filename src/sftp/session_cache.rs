// ABOUTME: Single-slot cache for an authenticated session keyed by its target.
// ABOUTME: Reconnects on target change or dropped session; closes exactly once.

use super::error::{Error, Result, TransferError};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Account and server a session was authenticated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub(crate) username: String,
    pub(crate) host: String,
    pub(crate) port: u16,
}

/// A session the cache can hand out and later tear down.
#[async_trait]
pub(crate) trait CachedSession: Send + Sync {
    fn target(&self) -> &Target;

    /// False once the transport has dropped.
    fn is_open(&self) -> bool;

    async fn shutdown(&self) -> std::result::Result<(), TransferError>;
}

pub(crate) struct SessionCache<S> {
    /// Held across connect so at most one session is being established.
    slot: tokio::sync::Mutex<Option<Arc<S>>>,
    closed: AtomicBool,
}

impl<S: CachedSession> SessionCache<S> {
    pub(crate) fn new() -> Self {
        Self {
            slot: tokio::sync::Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Return the cached session if it is open and matches `target`,
    /// otherwise drop it and call `connect` for a new one.
    pub(crate) async fn get_or_connect<F, Fut>(&self, target: Target, connect: F) -> Result<Arc<S>>
    where
        F: FnOnce(Target) -> Fut,
        Fut: Future<Output = std::result::Result<S, TransferError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.as_ref() {
            if session.is_open() && *session.target() == target {
                tracing::debug!("Reusing SFTP session to {}:{}", target.host, target.port);
                return Ok(Arc::clone(session));
            }
            tracing::debug!(
                "Discarding SFTP session to {}:{}",
                session.target().host,
                session.target().port
            );
            *slot = None;
        }

        // close() may have run while we waited for the slot
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let session = Arc::new(connect(target).await?);
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Mark the cache closed and shut down the cached session, if any.
    ///
    /// Only the first call does any work. The cache stays closed even when
    /// shutdown fails.
    pub(crate) async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let Some(session) = self.slot.lock().await.take() else {
            return Ok(());
        };
        tracing::debug!(
            "Closing SFTP session to {}:{}",
            session.target().host,
            session.target().port
        );
        session.shutdown().await.map_err(Error::Close)
    }
}
