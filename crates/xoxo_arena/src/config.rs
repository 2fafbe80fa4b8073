//! Arena configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ErrorLocation;

/// Tunables for the match engine and the storage backend.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// SQLite database file holding games and match records.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Fixed user id; an anonymous one is generated when absent.
    #[serde(default)]
    user_id: Option<String>,

    /// Pause between a finished round and the next one, in milliseconds.
    #[serde(default = "default_restart_delay_ms")]
    restart_delay_ms: u64,

    /// Computer "thinking" time before it moves, in milliseconds.
    #[serde(default = "default_computer_delay_ms")]
    computer_delay_ms: u64,

    /// Round wins needed to take a series.
    #[serde(default = "default_series_target")]
    series_target: u32,

    /// Maximum number of open games listed in the lobby.
    #[serde(default = "default_lobby_limit")]
    lobby_limit: usize,

    /// Seed for the computer opponent's tiebreaks; random when absent.
    #[serde(default)]
    rng_seed: Option<u64>,
}

#[instrument]
fn default_database_path() -> String {
    "xoxo_arena.db".to_string()
}

#[instrument]
fn default_restart_delay_ms() -> u64 {
    2000
}

#[instrument]
fn default_computer_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_series_target() -> u32 {
    5
}

#[instrument]
fn default_lobby_limit() -> usize {
    10
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            user_id: None,
            restart_delay_ms: default_restart_delay_ms(),
            computer_delay_ms: default_computer_delay_ms(),
            series_target: default_series_target(),
            lobby_limit: default_lobby_limit(),
            rng_seed: None,
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(database = %config.database_path, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the database path (command-line flags win over the file).
    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Overrides the user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Restart delay as a [`Duration`].
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    /// Computer thinking delay as a [`Duration`].
    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.computer_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.series_target == 0 {
            return Err(ConfigError::new("series_target must be at least 1".to_string()));
        }
        if self.lobby_limit == 0 {
            return Err(ConfigError::new("lobby_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}", message, location)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Where the error was raised.
    pub location: ErrorLocation,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        Self {
            message,
            location: ErrorLocation::caller(),
        }
    }
}
