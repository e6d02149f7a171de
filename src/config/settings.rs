//! Bot settings from `config.toml` and the environment.
//!
//! Secrets and deployment paths come from environment variables (a `.env` file is
//! loaded at startup). Everything else lives in an optional `config.toml`: Tebex
//! endpoint settings, the game server to probe, and apartments to create on first
//! run. A missing `config.toml` means defaults; a malformed one is an error.

use crate::{
    core::{apartment::ApartmentSeed, store::DEFAULT_LEDGER_PATH, tebex::DEFAULT_TEBEX_BASE_URL},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{io::ErrorKind, path::Path, path::PathBuf, time::Duration};
use tracing::{debug, info};

/// Default location of the settings file when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const DEFAULT_TEBEX_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Tebex plugin API settings
    pub tebex: TebexConfig,
    /// Game server checked by `/serverstatus`; the command is disabled without it
    pub server: Option<ServerConfig>,
    /// Apartments created at startup when missing
    pub apartments: Vec<ApartmentSeed>,
}

/// Tebex plugin API settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TebexConfig {
    /// API base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TebexConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TEBEX_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TEBEX_TIMEOUT_SECS,
        }
    }
}

impl TebexConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Game server probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// `host:port` of the game server
    pub address: String,
    /// Connect timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Connect timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const fn default_probe_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

/// Parses settings from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No {} found, using default settings", path.display());
            Ok(BotConfig::default())
        }
        _ => load_config(path),
    }
}

fn parse_config(contents: &str) -> std::result::Result<BotConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Path of the settings file: `CONFIG_PATH` or `config.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var("CONFIG_PATH").map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Path of the ledger document: `LEDGER_PATH` or `data/apartments.json`.
#[must_use]
pub fn ledger_path() -> PathBuf {
    std::env::var("LEDGER_PATH").map_or_else(|_| PathBuf::from(DEFAULT_LEDGER_PATH), PathBuf::from)
}

/// Reads a required environment variable, naming it in the error when absent.
pub fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) | Err(std::env::VarError::NotPresent) => Err(Error::Config {
            message: format!("{name} must be set"),
        }),
        Err(e) => Err(Error::EnvVar(e)),
    }
}

/// Guild to register commands in instead of globally (`DEV_GUILD_ID`).
/// Guild registration is instant, which is handy while developing.
pub fn dev_guild_id() -> Result<Option<u64>> {
    match std::env::var("DEV_GUILD_ID") {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|e| Error::Config {
            message: format!("DEV_GUILD_ID '{raw}' is not a guild id: {e}"),
        }),
        Err(_) => Ok(None),
    }
}
