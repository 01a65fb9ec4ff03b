// ABOUTME: Validated connection parameters shared by every client variant.
// ABOUTME: Rejects empty usernames and hosts and ports outside 0..=65535.

mod port;

pub use port::Port;

use thiserror::Error;

/// Invalid argument passed to a client mutator or URI helper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("host cannot be empty")]
    EmptyHost,

    #[error("port out of range: {0} (expected 0-65535)")]
    PortOutOfRange(i64),
}

/// Check a username before it replaces the current one.
pub fn validate_username(username: &str) -> Result<&str, UsageError> {
    if username.trim().is_empty() {
        return Err(UsageError::EmptyUsername);
    }
    Ok(username)
}

/// Check a host before it replaces the current one.
pub fn validate_host(host: &str) -> Result<&str, UsageError> {
    if host.trim().is_empty() {
        return Err(UsageError::EmptyHost);
    }
    Ok(host)
}
