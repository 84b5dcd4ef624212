//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub sessions: SessionsConfig,
    pub ledger: LedgerConfig,
    pub dialog: DialogConfig,
    pub dispatch: DispatchConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Which ledger store backs the bot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// Ledger store selection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Where per-chat dialog sessions live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Redis,
    Memory,
}

/// Session storage selection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub backend: SessionBackend,
}

/// Expense ledger behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Currency assigned to groups that never chose one
    pub default_currency: String,
    /// How many expenses `/transactions` shows
    pub list_limit: i64,
}

/// Edit dialog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DialogConfig {
    /// An edit dialog left untouched this long is abandoned
    pub ttl_seconds: u64,
}

/// Dispatch serializer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Idle per-chat lanes are dropped after this many seconds
    pub idle_lane_seconds: u64,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub directory: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// Environment variables use the `SPLITBUDDY__` prefix with `__` between
    /// nesting levels, e.g. `SPLITBUDDY__BOT__TOKEN`.
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("SPLITBUDDY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::SplitBuddyError> {
        super::validation::validate_settings(self)
    }

    /// Render the settings as a TOML document, e.g. to seed `config.toml`
    pub fn to_toml(&self) -> Result<String, crate::utils::errors::SplitBuddyError> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::utils::errors::SplitBuddyError::Config(e.to_string()))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/splitbuddy".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "splitbuddy:".to_string(),
            ttl_seconds: 3600,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            list_limit: 10,
        }
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self { ttl_seconds: 900 }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            idle_lane_seconds: 300,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string(), "ru".to_string()],
            directory: "translations".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ledger.default_currency, "USD");
        assert_eq!(settings.dialog.ttl_seconds, 900);
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert_eq!(settings.sessions.backend, SessionBackend::Redis);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let raw = r#"
            [bot]
            token = "123:abc"

            [storage]
            backend = "memory"

            [ledger]
            default_currency = "EUR"
        "#;
        let settings: Settings = toml::from_str(raw).unwrap();
        assert_eq!(settings.bot.token, "123:abc");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.ledger.default_currency, "EUR");
        assert_eq!(settings.ledger.list_limit, 10);
        assert_eq!(settings.redis.prefix, "splitbuddy:");
    }

    #[test]
    fn test_to_toml_round_trips_backend() {
        let mut settings = Settings::default();
        settings.sessions.backend = SessionBackend::Memory;
        let rendered = settings.to_toml().unwrap();
        assert!(rendered.contains("backend = \"memory\""));
    }
}
