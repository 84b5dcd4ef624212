//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{SplitBuddyError, Result};
use crate::utils::helpers::is_valid_currency_code;
use super::{Settings, SessionBackend, StorageBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    if settings.storage.backend == StorageBackend::Postgres {
        validate_database_config(&settings.database)?;
    }
    if settings.sessions.backend == SessionBackend::Redis {
        validate_redis_config(&settings.redis)?;
    }
    validate_ledger_config(&settings.ledger)?;
    validate_runtime_config(settings)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(SplitBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SplitBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(SplitBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SplitBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SplitBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(SplitBuddyError::Config(
            "Redis TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_ledger_config(config: &super::LedgerConfig) -> Result<()> {
    if !is_valid_currency_code(&config.default_currency) {
        return Err(SplitBuddyError::Config(
            format!("Invalid default currency: {}", config.default_currency)
        ));
    }

    if config.list_limit <= 0 {
        return Err(SplitBuddyError::Config(
            "Transaction list limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_runtime_config(settings: &Settings) -> Result<()> {
    if settings.dialog.ttl_seconds == 0 {
        return Err(SplitBuddyError::Config(
            "Dialog TTL must be greater than 0".to_string()
        ));
    }

    if settings.dispatch.idle_lane_seconds == 0 {
        return Err(SplitBuddyError::Config(
            "Idle lane timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(SplitBuddyError::Config(
            "Default language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(SplitBuddyError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SplitBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
