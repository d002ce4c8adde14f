//! Settings loaded from TOML.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use mastermind_rules::DigitRange;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::store::{Ttl, TtlDefaults};

/// Shortest secret combination accepted.
pub const MIN_SECRET_LENGTH: usize = 4;

/// Top-level application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct Settings {
    /// Game rules and per-game expirations.
    game_play: GamePlaySettings,
    /// Session store backend and defaults.
    store: StoreSettings,
    /// Remote randomness service.
    random_api: RandomApiSettings,
    /// HTTP listener.
    server: ServerSettings,
}

/// Game rules.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct GamePlaySettings {
    /// Smallest digit allowed.
    digit_min: i32,
    /// Largest digit allowed.
    digit_max: i32,
    /// Number of digits in a secret.
    secret_combination_length: usize,
    /// Guesses allowed per game.
    default_attempt_limit: u32,
    /// Sliding expiration for games; store default when unset.
    sliding_expiration_seconds: Option<u64>,
    /// Absolute expiration for games; store default when unset.
    absolute_expiration_seconds: Option<u64>,
}

impl Default for GamePlaySettings {
    fn default() -> Self {
        Self {
            digit_min: 0,
            digit_max: 7,
            secret_combination_length: MIN_SECRET_LENGTH,
            default_attempt_limit: 10,
            sliding_expiration_seconds: None,
            absolute_expiration_seconds: None,
        }
    }
}

impl GamePlaySettings {
    /// Allowed digits as a range.
    pub fn digit_range(&self) -> DigitRange {
        DigitRange::new(self.digit_min, self.digit_max)
    }

    /// Expirations requested for each game write.
    pub fn ttl(&self) -> Ttl {
        Ttl::new(
            self.absolute_expiration_seconds.map(Duration::from_secs),
            self.sliding_expiration_seconds.map(Duration::from_secs),
        )
    }

    /// Checks the game rules on their own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a secret shorter than [`MIN_SECRET_LENGTH`],
    /// a zero attempt limit, an inverted digit range, or a sliding expiration
    /// longer than the absolute one.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_combination_length < MIN_SECRET_LENGTH {
            return Err(ConfigError::new(format!(
                "game_play.secret_combination_length must be at least {}, got {}",
                MIN_SECRET_LENGTH, self.secret_combination_length
            )));
        }
        if self.default_attempt_limit == 0 {
            return Err(ConfigError::new("game_play.default_attempt_limit must be positive"));
        }
        if self.digit_min > self.digit_max {
            return Err(ConfigError::new(format!(
                "game_play.digit_min ({}) exceeds digit_max ({})",
                self.digit_min, self.digit_max
            )));
        }
        if let (Some(sliding), Some(absolute)) = (self.sliding_expiration_seconds, self.absolute_expiration_seconds)
            && sliding > absolute
        {
            return Err(ConfigError::new(format!(
                "game_play.sliding_expiration_seconds ({}) exceeds absolute_expiration_seconds ({})",
                sliding, absolute
            )));
        }

        Ok(())
    }
}

/// Which session store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map; state is lost on restart.
    #[default]
    Memory,
    /// Networked key-value service.
    Http,
}

/// Session store settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct StoreSettings {
    /// Backend kind.
    backend: StoreBackend,
    /// Base URL of the networked store; required for the http backend.
    base_url: Option<String>,
    /// Emit debug events for misses and writes.
    enable_diagnostics: bool,
    /// Default absolute expiration; 0 disables.
    default_absolute_expiration_seconds: u64,
    /// Default sliding expiration; 0 disables.
    default_sliding_expiration_seconds: u64,
    /// Request timeout for the http backend.
    timeout_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            base_url: None,
            enable_diagnostics: false,
            default_absolute_expiration_seconds: 0,
            default_sliding_expiration_seconds: 1800,
            timeout_seconds: 5,
        }
    }
}

impl StoreSettings {
    /// Store-wide TTL defaults.
    pub fn ttl_defaults(&self) -> TtlDefaults {
        TtlDefaults {
            absolute: Duration::from_secs(self.default_absolute_expiration_seconds),
            sliding: Duration::from_secs(self.default_sliding_expiration_seconds),
        }
    }

    /// Request timeout for the http backend.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Remote randomness service settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct RandomApiSettings {
    /// Service root, e.g. `https://www.random.org/`.
    base_address: String,
    /// Integers endpoint relative to the root.
    integers_endpoint: String,
    /// Per-request timeout.
    timeout_seconds: u64,
}

impl Default for RandomApiSettings {
    fn default() -> Self {
        Self {
            base_address: "https://www.random.org/".to_string(),
            integers_endpoint: "integers/".to_string(),
            timeout_seconds: 5,
        }
    }
}

impl RandomApiSettings {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    host: String,
    /// Port to bind.
    port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file not found; using defaults");
            return Ok(Self::default());
        }

        debug!("Loading config from file");
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let settings = Self::from_toml_str(&content)?;
        info!("Config loaded successfully");
        Ok(settings)
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid settings TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Renders the effective settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first violated constraint.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game_play.validate()?;

        if self.store.backend == StoreBackend::Http
            && self.store.base_url.as_deref().is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::new("store.base_url is required for the http backend"));
        }
        if self.store.timeout_seconds == 0 {
            return Err(ConfigError::new("store.timeout_seconds must be positive"));
        }

        if self.random_api.timeout_seconds == 0 {
            return Err(ConfigError::new("random_api.timeout_seconds must be positive"));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::new("server.host must not be empty"));
        }

        debug!("Config validated");
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
