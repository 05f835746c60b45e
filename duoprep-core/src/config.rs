//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/duoprep/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/duoprep/` (~/.config/duoprep/)
//! - State/Logs/Markers: `$XDG_STATE_HOME/duoprep/` (~/.local/state/duoprep/)

use crate::error::{Error, Result};
use crate::types::Participant;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote row-store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Participant display names and access codes
    #[serde(default)]
    pub participants: ParticipantsConfig,

    /// Tracker-wide settings (race target, polling)
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote row-store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Base URL of the row store (e.g., `https://abc.supabase.co`)
    pub url: Option<String>,

    /// Anonymous API key for the project
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,

    /// Max retry attempts for transient failures
    #[serde(default = "default_store_max_retries")]
    pub max_retries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: default_store_timeout(),
            max_retries: default_store_max_retries(),
        }
    }
}

impl StoreConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.url.is_none() {
            return Err(Error::Config("store.url is required".to_string()));
        }
        if self.api_key.is_none() {
            return Err(Error::Config("store.api_key is required".to_string()));
        }
        Ok(())
    }
}

fn default_store_timeout() -> u64 {
    30
}

fn default_store_max_retries() -> usize {
    3
}

/// One participant slot's profile
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParticipantProfile {
    /// Display name shown on the dashboard
    #[serde(default)]
    pub name: Option<String>,

    /// SHA-256 digest (hex) of this slot's access code
    pub access_code_sha256: Option<String>,
}

/// Both participant slots
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParticipantsConfig {
    #[serde(default)]
    pub user1: ParticipantProfile,
    #[serde(default)]
    pub user2: ParticipantProfile,
}

impl ParticipantsConfig {
    pub fn profile(&self, participant: Participant) -> &ParticipantProfile {
        match participant {
            Participant::One => &self.user1,
            Participant::Two => &self.user2,
        }
    }

    /// Check a plaintext access code against the stored digest for a slot.
    ///
    /// A slot with no digest configured accepts any code; that is the
    /// whole extent of authentication here.
    pub fn verify_access_code(&self, participant: Participant, code: &str) -> bool {
        match &self.profile(participant).access_code_sha256 {
            None => true,
            Some(expected) => {
                let digest = Sha256::digest(code.as_bytes());
                hex::encode(digest).eq_ignore_ascii_case(expected)
            }
        }
    }
}

/// Tracker-wide settings
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    /// Shared race target used by the message selector
    #[serde(default = "default_shared_target")]
    pub shared_target: i64,

    /// Seconds between store polls in watch mode
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            shared_target: default_shared_target(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_shared_target() -> i64 {
    crate::stats::DAILY_TARGET
}

fn default_poll_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/duoprep/config.toml` (~/.config/duoprep/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("duoprep").join("config.toml")
    }

    /// Returns the state directory path (for logs and markers)
    ///
    /// `$XDG_STATE_HOME/duoprep/` (~/.local/state/duoprep/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("duoprep")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("duoprep.log")
    }

    /// Returns the notification marker file path
    pub fn marker_path() -> PathBuf {
        Self::state_dir().join("markers.json")
    }

    /// Display name for a participant slot, falling back to the wire tag.
    pub fn display_name(&self, participant: Participant) -> String {
        self.participants
            .profile(participant)
            .name
            .clone()
            .unwrap_or_else(|| participant.as_str().to_string())
    }
}
