// ABOUTME: Helpers for sftp:// resource URIs.
// ABOUTME: Scheme check, user@host:port validation and port rewriting.

use crate::types::{Port, UsageError};
use url::Url;

pub const SFTP_SCHEME: &str = "sftp";

/// Whether the URL uses the `sftp` scheme, ignoring case.
pub fn is_sftp_url(url: &Url) -> bool {
    url.scheme().eq_ignore_ascii_case(SFTP_SCHEME)
}

/// Whether `uri` names a file reachable over SFTP.
///
/// A valid URI has the `sftp` scheme, a `user@host` authority with a
/// non-empty user, and an explicit port, e.g. `sftp://deploy@files:22/data`.
pub fn validate_uri(uri: &str) -> bool {
    let Ok(url) = Url::parse(uri) else {
        return false;
    };
    validate_url(&url)
}

/// Same as [`validate_uri`] for an already parsed URL.
pub fn validate_url(url: &Url) -> bool {
    if !is_sftp_url(url) {
        return false;
    }

    // An '@' inside the user part arrives percent-encoded
    let user_parts: Vec<&str> = url.authority().split('@').collect();
    if user_parts.len() != 2 || url.username().is_empty() || url.username().contains("%40") {
        return false;
    }

    if url.host_str().is_none_or(str::is_empty) {
        return false;
    }

    url.port().is_some()
}

/// Copy of `url` with its port replaced. Every other component is kept.
pub fn with_port(url: &Url, port: i32) -> Result<Url, UsageError> {
    let port = Port::try_from(port)?;
    let mut rewritten = url.clone();
    // Only fails for URLs that cannot carry a port at all
    if rewritten.set_port(Some(port.get())).is_err() {
        return Err(UsageError::EmptyHost);
    }
    Ok(rewritten)
}
