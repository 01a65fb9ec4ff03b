// ABOUTME: SFTP client module for fetching and publishing sftp:// resources.
// ABOUTME: Eager, lazy and placeholder clients behind one RemoteClient trait.

mod builder;
mod client;
mod dummy;
mod eager;
mod error;
mod handler;
pub mod keys;
mod lazy;
mod session_cache;

pub use builder::ClientBuilder;
pub use client::{Client, RemoteClient};
pub use dummy::DummyClient;
pub use eager::EagerClient;
pub use error::{Error, InitError, Result, TransferError};
pub use lazy::{ClientFactory, LazyClient};

/// Creates a new client builder with default settings.
pub fn builder() -> ClientBuilder {
    ClientBuilder::new()
}
