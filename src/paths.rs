// src/paths.rs

//! XDG base directory resolution and derived hc paths

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Application directory name under the XDG homes
pub const APP_DIR: &str = "hc";

/// Read an environment variable, treating empty values as unset
fn env(variable: &str) -> Option<String> {
    std::env::var(variable).ok().filter(|v| !v.is_empty())
}

fn home() -> Result<PathBuf> {
    env("HOME").map(PathBuf::from).or_else(dirs::home_dir).ok_or_else(|| {
        Error::InitError(
            "Cannot determine home directory: no appropriate environment variable presents"
                .to_string(),
        )
    })
}

/// `$XDG_DATA_HOME`, or `$HOME/.local/share`
pub fn data_home() -> Result<PathBuf> {
    match env("XDG_DATA_HOME") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(home()?.join(".local").join("share")),
    }
}

/// `$XDG_CONFIG_HOME`, or `$HOME/.config`
pub fn config_home() -> Result<PathBuf> {
    match env("XDG_CONFIG_HOME") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(home()?.join(".config")),
    }
}

/// Default data directory (`<data home>/hc`)
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(data_home()?.join(APP_DIR))
}

/// Default config file (`<config home>/hc/config.toml`)
pub fn default_config_file() -> Result<PathBuf> {
    Ok(config_home()?.join(APP_DIR).join("config.toml"))
}

/// Default scratch directory for exports
pub fn default_export_dir() -> PathBuf {
    std::env::temp_dir().join(APP_DIR)
}

/// Database file inside a data directory
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("hc.db")
}

/// Stored submission files inside a data directory
pub fn files_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("files")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path() {
        assert_eq!(
            db_path(Path::new("/home/u/.local/share/hc")),
            PathBuf::from("/home/u/.local/share/hc/hc.db")
        );
    }

    #[test]
    fn test_files_dir() {
        assert_eq!(
            files_dir(Path::new("/srv/hc")),
            PathBuf::from("/srv/hc/files")
        );
    }

    #[test]
    fn test_default_export_dir() {
        assert!(default_export_dir().ends_with(APP_DIR));
    }

    #[test]
    fn test_defaults_end_with_app_dir() {
        // Resolution depends on the environment; only the suffix is stable.
        if let Ok(dir) = default_data_dir() {
            assert!(dir.ends_with(APP_DIR));
        }
        if let Ok(file) = default_config_file() {
            assert!(file.ends_with("hc/config.toml"));
        }
    }
}
