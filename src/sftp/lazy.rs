// ABOUTME: RemoteClient decorator that defers building the real client until first use.
// ABOUTME: Construction runs at most once; its failure is replayed to every caller.

use super::client::RemoteClient;
use super::error::{Error, InitError, Result};
use crate::types::{Port, validate_host, validate_username};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Builds the underlying client. Called at most once.
pub type ClientFactory =
    Box<dyn FnOnce() -> std::result::Result<Arc<dyn RemoteClient>, InitError> + Send>;

enum State {
    Unbuilt(ClientFactory),
    Ready(Arc<dyn RemoteClient>),
    Failed(Arc<InitError>),
    Closed,
}

impl State {
    /// Run the factory if it has not run yet.
    ///
    /// A panicking factory is recorded as a failure like any other, so the
    /// slot never stays in the placeholder state.
    fn resolve(&mut self) {
        if !matches!(self, State::Unbuilt(_)) {
            return;
        }
        let State::Unbuilt(factory) = std::mem::replace(self, State::Closed) else {
            return;
        };
        *self = match run_factory(factory) {
            Ok(client) => State::Ready(client),
            Err(e) => {
                tracing::debug!("Deferred SFTP client construction failed: {}", e);
                State::Failed(Arc::new(e))
            }
        };
    }

    fn name(&self) -> &'static str {
        match self {
            State::Unbuilt(_) => "unbuilt",
            State::Ready(_) => "ready",
            State::Failed(_) => "failed",
            State::Closed => "closed",
        }
    }
}

/// Call the factory, converting a panic into [`InitError::Panicked`].
///
/// Construction does blocking file I/O. On a multi-threaded tokio runtime it
/// runs under `block_in_place` so the worker's other tasks are moved off first.
fn run_factory(factory: ClientFactory) -> std::result::Result<Arc<dyn RemoteClient>, InitError> {
    let build = move || match panic::catch_unwind(AssertUnwindSafe(factory)) {
        Ok(result) => result,
        Err(payload) => Err(InitError::Panicked(panic_message(payload.as_ref()))),
    };
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(build)
        }
        _ => build(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A [`RemoteClient`] that defers creating the underlying client until the
/// first transfer or mutator call.
///
/// Any error raised while building the underlying client is deferred as well,
/// and every later call returns that same error. The factory runs while the
/// internal lock is held, so concurrent first callers wait for it.
pub struct LazyClient {
    state: Mutex<State>,
}

impl std::fmt::Debug for LazyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyClient")
            .field("state", &self.state.lock().name())
            .finish()
    }
}

impl LazyClient {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> std::result::Result<Arc<dyn RemoteClient>, InitError> + Send + 'static,
    {
        Self {
            state: Mutex::new(State::Unbuilt(Box::new(factory))),
        }
    }

    /// Whether the factory has run.
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.state.lock(), State::Ready(_) | State::Failed(_))
    }

    fn get_or_create(&self) -> Result<Arc<dyn RemoteClient>> {
        let mut state = self.state.lock();
        state.resolve();
        match &*state {
            State::Ready(client) => Ok(Arc::clone(client)),
            State::Failed(e) => Err(Error::Initialization(Arc::clone(e))),
            State::Unbuilt(_) | State::Closed => Err(Error::Closed),
        }
    }
}

#[async_trait]
impl RemoteClient for LazyClient {
    fn set_username(&self, username: &str) -> Result<()> {
        validate_username(username)?;
        self.get_or_create()?.set_username(username)
    }

    fn set_host(&self, host: &str) -> Result<()> {
        validate_host(host)?;
        self.get_or_create()?.set_host(host)
    }

    fn set_port(&self, port: i32) -> Result<()> {
        Port::try_from(port)?;
        self.get_or_create()?.set_port(port)
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        self.get_or_create()?.upload(local_path, remote_path).await
    }

    async fn download(&self, remote_path: &str) -> Result<Vec<u8>> {
        self.get_or_create()?.download(remote_path).await
    }

    /// Closes the underlying client if it was ever built. Never builds it.
    async fn close(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.state.lock(), State::Closed);
        match previous {
            State::Ready(client) => client.close().await,
            State::Unbuilt(_) | State::Failed(_) | State::Closed => Ok(()),
        }
    }
}
