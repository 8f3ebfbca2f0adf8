//! Centralized path management for sftp-provision

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the sftp-provision data directory
pub fn provision_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("sftp-provision");

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory at {}", data_dir.display()))?;

    Ok(data_dir)
}

/// Get the directory holding debug command logs
pub fn command_logs_dir() -> Result<PathBuf> {
    let logs_dir = provision_data_dir()?.join("logs");
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("creating command logs directory at {}", logs_dir.display()))?;
    Ok(logs_dir)
}
