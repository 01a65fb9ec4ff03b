// ABOUTME: Library root for sftp-resource.
// ABOUTME: Thread-safe SFTP client handles for fetching and publishing sftp:// resources.

pub mod config;
pub mod error;
pub mod sftp;
pub mod types;
pub mod uri;
