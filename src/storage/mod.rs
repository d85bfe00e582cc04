//! Storage Layer
//!
//! Locates the per-user configuration directory.

use anyhow::Result;
use std::path::PathBuf;

/// Config file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "blockdetect", "BlockDetect")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}
