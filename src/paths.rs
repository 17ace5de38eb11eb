//! Per-user directories for credentials, downloads and logs.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "ytm-browser", "ytm-browser")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Directory scanned for saved sessions (cURL captures or JSON).
pub fn get_credentials_dir() -> Result<PathBuf> {
    let dir = get_data_dir()?.join("auth");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn get_download_dir() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("music"))
}

pub fn get_log_dir() -> Result<PathBuf> {
    let dir = project_dirs()?.cache_dir().join("logs");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
