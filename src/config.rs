// src/config.rs

//! Configuration file parsing
//!
//! Supports an optional TOML file with the following sections:
//! - [server] - Host and port to listen on, request size limit
//! - [storage] - Data directory, export scratch directory and retention
//! - [admin] - Credentials accepted by /api/admin/login
//!
//! Command-line flags override values from the file.

use crate::paths;
use crate::server::ServerConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct HcConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub admin: AdminSection,
}

/// Server configuration section
#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body (e.g., "256MB"); base64 uploads are
    /// about 4/3 the size of the file
    #[serde(default = "default_max_upload")]
    pub max_upload: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload: default_max_upload(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload() -> String {
    "256MB".to_string()
}

/// Storage configuration section
#[derive(Debug, Deserialize)]
pub struct StorageSection {
    /// Data directory (default: $XDG_DATA_HOME/hc)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Scratch directory for export archives (default: $TMPDIR/hc)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// How long an exported archive is kept on disk
    #[serde(default = "default_export_ttl")]
    pub export_ttl: String,

    /// How often expired exports are swept in the background
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
            export_ttl: default_export_ttl(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_export_ttl() -> String {
    "1h".to_string()
}

fn default_cleanup_interval() -> String {
    "10m".to_string()
}

/// Admin credentials section
#[derive(Debug, Deserialize)]
pub struct AdminSection {
    #[serde(default = "default_admin")]
    pub username: String,

    #[serde(default = "default_admin")]
    pub password: String,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            username: default_admin(),
            password: default_admin(),
        }
    }
}

fn default_admin() -> String {
    "admin".to_string()
}

impl HcConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: HcConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else the default config file if it exists,
    /// else the built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match paths::default_config_file() {
            Ok(path) if path.exists() => {
                tracing::debug!("Using config file {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }

        let max_upload = parse_size(&self.server.max_upload)
            .with_context(|| format!("Invalid server.max_upload: {}", self.server.max_upload))?;
        if max_upload == 0 {
            anyhow::bail!("server.max_upload must be greater than zero");
        }

        parse_duration(&self.storage.export_ttl)
            .with_context(|| format!("Invalid storage.export_ttl: {}", self.storage.export_ttl))?;

        let interval = parse_duration(&self.storage.cleanup_interval).with_context(|| {
            format!(
                "Invalid storage.cleanup_interval: {}",
                self.storage.cleanup_interval
            )
        })?;
        if interval.is_zero() {
            anyhow::bail!("storage.cleanup_interval must be greater than zero");
        }

        if self.admin.username.is_empty() {
            anyhow::bail!("admin.username must not be empty");
        }

        Ok(())
    }

    /// Whether the admin credentials are still the built-in defaults
    pub fn uses_default_admin(&self) -> bool {
        self.admin.username == default_admin() && self.admin.password == default_admin()
    }

    /// Convert to the internal ServerConfig structure
    pub fn to_server_config(&self) -> Result<ServerConfig> {
        let data_dir = match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => paths::default_data_dir()?,
        };

        let mut config = ServerConfig::with_data_dir(data_dir);
        config.host = self.server.host.clone();
        config.port = self.server.port;
        config.max_upload = usize::try_from(parse_size(&self.server.max_upload)?)
            .context("server.max_upload does not fit in memory on this platform")?;
        if let Some(dir) = &self.storage.export_dir {
            config.export_dir = dir.clone();
        }
        config.export_ttl = parse_duration(&self.storage.export_ttl)?;
        config.cleanup_interval = parse_duration(&self.storage.cleanup_interval)?;
        config.admin_username = self.admin.username.clone();
        config.admin_password = self.admin.password.clone();
        Ok(config)
    }
}

/// Split "<number><unit>" and scale the number by the unit's multiplier
///
/// A bare number uses `default`. Overflow is an error, not a wrap.
fn parse_scaled(s: &str, units: &[(&str, u64)], default: u64, what: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = units
        .iter()
        .find_map(|(suffix, multiplier)| s.strip_suffix(*suffix).map(|n| (n, *multiplier)))
        .unwrap_or((s.as_str(), default));

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} number: {}", what, num_str))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("{} too large: {}", what, s))
}

/// Parse a human-readable duration string (e.g., "15m", "1h", "30s")
///
/// A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    const UNITS: &[(&str, u64)] = &[("d", 24 * 60 * 60), ("h", 60 * 60), ("m", 60), ("s", 1)];
    parse_scaled(s, UNITS, 1, "duration").map(Duration::from_secs)
}

/// Parse a human-readable byte size (e.g., "512KB", "256MB", "1GB")
///
/// Units are binary (1KB = 1024 bytes). A bare number is bytes.
pub fn parse_size(s: &str) -> Result<u64> {
    // Longer suffixes first so "mb" is not read as "b"
    const UNITS: &[(&str, u64)] = &[
        ("gb", 1024 * 1024 * 1024),
        ("mb", 1024 * 1024),
        ("kb", 1024),
        ("b", 1),
    ];
    parse_scaled(s, UNITS, 1, "size")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(15 * 60));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(2 * 24 * 3600));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_parse_duration_overflow_is_an_error() {
        let err = parse_duration("300000000000000d").unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(parse_duration("18446744073709551615s").is_ok());
        assert!(parse_duration("18446744073709551616s").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100").unwrap(), 100);
        assert_eq!(parse_size("100B").unwrap(), 100);
        assert_eq!(parse_size("512KB").unwrap(), 512 * 1024);
        assert_eq!(parse_size("256MB").unwrap(), 256 * 1024 * 1024);
        assert_eq!(parse_size(" 2gb ").unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(parse_size("big").is_err());
        assert!(parse_size("99999999999999999999GB").is_err());
        assert!(parse_size("18014398509481984GB").is_err());
    }

    #[test]
    fn test_invalid_max_upload() {
        let config: HcConfig = toml::from_str("[server]\nmax_upload = \"0\"\n").unwrap();
        assert!(config.validate().is_err());

        let config: HcConfig = toml::from_str("[server]\nmax_upload = \"lots\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = HcConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.export_ttl, "1h");
        assert_eq!(config.server.max_upload, "256MB");
        assert!(config.uses_default_admin());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
host = "0.0.0.0"
port = 10010
max_upload = "64MB"

[storage]
data_dir = "/srv/hc"
export_dir = "/tmp/hc-exports"
export_ttl = "30m"

[admin]
username = "instructor"
password = "secret"
"#;
        let config: HcConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.uses_default_admin());

        let server = config.to_server_config().unwrap();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 10010);
        assert_eq!(server.max_upload, 64 * 1024 * 1024);
        assert_eq!(server.data_dir, PathBuf::from("/srv/hc"));
        assert_eq!(server.db_path, PathBuf::from("/srv/hc/hc.db"));
        assert_eq!(server.files_dir, PathBuf::from("/srv/hc/files"));
        assert_eq!(server.export_dir, PathBuf::from("/tmp/hc-exports"));
        assert_eq!(server.export_ttl, Duration::from_secs(30 * 60));
        assert_eq!(server.cleanup_interval, Duration::from_secs(10 * 60));
        assert_eq!(server.admin_username, "instructor");
    }

    #[test]
    fn test_invalid_export_ttl() {
        let toml_str = r#"
[storage]
export_ttl = "forever"
"#;
        let config: HcConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cleanup_interval() {
        let toml_str = r#"
[storage]
cleanup_interval = "0s"
"#;
        let config: HcConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = HcConfig::discover(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "localhost");

        assert!(HcConfig::discover(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
