//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SplitBuddy application.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::{Result, SplitBuddyError};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, "splitbuddy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| SplitBuddyError::Config(format!("invalid log filter: {e}")))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .try_init()
        .map_err(|e| SplitBuddyError::Config(format!("logging already initialized: {e}")))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log expense lifecycle actions
pub fn log_expense_action(group_id: i64, expense_id: i64, action: &str, user_id: i64) {
    info!(
        group_id = group_id,
        expense_id = expense_id,
        action = action,
        user_id = user_id,
        "Expense action performed"
    );
}

/// Log membership changes
pub fn log_member_action(group_id: i64, user_id: i64, action: &str, actor_id: Option<i64>) {
    info!(
        group_id = group_id,
        user_id = user_id,
        action = action,
        actor_id = actor_id,
        "Member action performed"
    );
}

/// Log edit dialog transitions
pub fn log_dialog_transition(chat_id: i64, expense_id: Option<i64>, from: &str, to: &str) {
    debug!(
        chat_id = chat_id,
        expense_id = expense_id,
        from = from,
        to = to,
        "Edit dialog transition"
    );
}

/// Log a rejected request (ownership or precondition failures)
pub fn log_rejection(chat_id: i64, user_id: Option<i64>, reason: &str) {
    warn!(
        chat_id = chat_id,
        user_id = user_id,
        reason = reason,
        "Request rejected"
    );
}
