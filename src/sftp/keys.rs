// ABOUTME: Locations and loading of the user's SSH private key.
// ABOUTME: Resolves ~/.ssh from HOME the same way ssh(1) does.

use super::error::InitError;
use std::path::{Path, PathBuf};

const DEFAULT_KEY_FILE: &str = "id_rsa";

/// The user's `~/.ssh` directory.
pub fn ssh_home_dir() -> Result<PathBuf, InitError> {
    let home = std::env::var_os("HOME").ok_or(InitError::HomeNotSet)?;
    Ok(PathBuf::from(home).join(".ssh"))
}

/// `~/.ssh/id_rsa`, used when no key path is configured.
pub fn default_key_path() -> Result<PathBuf, InitError> {
    Ok(ssh_home_dir()?.join(DEFAULT_KEY_FILE))
}

/// Read a private key file as text, with every line terminated by `\n`.
pub fn read_private_key(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(|line| format!("{line}\n")).collect())
}
