//! Configuration loading.
//!
//! Settings live in `<config_dir>/ttywrite/config.toml`. Every field is
//! optional; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Smallest usable line buffer: one byte of data plus the terminator slot.
const MIN_LINE_LIMIT: usize = 2;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where the login session table is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default = "default_utmp_path")]
    pub utmp_path: PathBuf,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            utmp_path: default_utmp_path(),
        }
    }
}

/// Directory terminal names are resolved against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicesConfig {
    #[serde(default = "default_dev_dir")]
    pub dev_dir: PathBuf,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            dev_dir: default_dev_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Input buffer size per read, terminator included
    #[serde(default = "default_line_limit")]
    pub line_limit: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            line_limit: default_line_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, overridden by `TTYWRITE_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_utmp_path() -> PathBuf {
    PathBuf::from("/var/run/utmp")
}

fn default_dev_dir() -> PathBuf {
    PathBuf::from("/dev")
}

fn default_line_limit() -> usize {
    512
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            // No home directory (daemons, stripped environments)
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.relay.line_limit = config.relay.line_limit.max(MIN_LINE_LIMIT);
        Ok(config)
    }

    /// Reset the session table and device directory to the system paths.
    ///
    /// A setgid install runs with a group the invoking user does not have,
    /// so the files that decide who may be written to must not come from
    /// that user's config. Returns whether an override was dropped.
    pub fn pin_system_paths(&mut self) -> bool {
        let overridden = self.sessions != SessionsConfig::default()
            || self.devices != DevicesConfig::default();
        self.sessions = SessionsConfig::default();
        self.devices = DevicesConfig::default();
        overridden
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("ttywrite").join("config.toml"))
    }
}
