//! Error handling for SplitBuddy
//!
//! This module defines the main error type used throughout the application.
//! Domain failures (validation, ownership, missing entities) are expected and
//! end up as a single user-facing reply; infrastructure failures are fatal to
//! the request that hit them.

use thiserror::Error;

/// Main error type for SplitBuddy application
#[derive(Error, Debug)]
pub enum SplitBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No expense is attached to message {message_id}")]
    NotAnExpense { message_id: i64 },

    #[error("Only the payer may change expense {expense_id}")]
    NotOwner { expense_id: i64 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Group {group_id} has no active members")]
    NoActiveMembers { group_id: i64 },

    #[error("Edit dialog precondition failed: {0}")]
    DialogPreconditionFailed(String),
}

/// Result type alias for SplitBuddy operations
pub type Result<T> = std::result::Result<T, SplitBuddyError>;

impl SplitBuddyError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors are reported to the user and the chat keeps working.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SplitBuddyError::Database(_) => false,
            SplitBuddyError::Migration(_) => false,
            SplitBuddyError::Telegram(_) => true,
            SplitBuddyError::Redis(_) => false,
            SplitBuddyError::Serialization(_) => false,
            SplitBuddyError::Io(_) => false,
            SplitBuddyError::Config(_) => false,
            SplitBuddyError::Dispatch(_) => false,
            SplitBuddyError::Validation(_) => true,
            SplitBuddyError::NotFound(_) => true,
            SplitBuddyError::NotAnExpense { .. } => true,
            SplitBuddyError::NotOwner { .. } => true,
            SplitBuddyError::PermissionDenied(_) => true,
            SplitBuddyError::NoActiveMembers { .. } => true,
            SplitBuddyError::DialogPreconditionFailed(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SplitBuddyError::Database(_) => ErrorSeverity::Critical,
            SplitBuddyError::Migration(_) => ErrorSeverity::Critical,
            SplitBuddyError::Config(_) => ErrorSeverity::Critical,
            SplitBuddyError::Redis(_) => ErrorSeverity::Critical,
            SplitBuddyError::NotOwner { .. } => ErrorSeverity::Warning,
            SplitBuddyError::PermissionDenied(_) => ErrorSeverity::Warning,
            SplitBuddyError::Validation(_) => ErrorSeverity::Info,
            SplitBuddyError::NotFound(_) => ErrorSeverity::Info,
            SplitBuddyError::NotAnExpense { .. } => ErrorSeverity::Info,
            SplitBuddyError::NoActiveMembers { .. } => ErrorSeverity::Info,
            SplitBuddyError::DialogPreconditionFailed(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Translation key of the reply shown to the user for this error.
    ///
    /// Messages never name the real owner of an expense.
    pub fn reply_key(&self) -> &'static str {
        match self {
            SplitBuddyError::Validation(_) => "errors.invalid_input",
            SplitBuddyError::NotFound(_) => "errors.not_found",
            SplitBuddyError::NotAnExpense { .. } => "errors.not_an_expense",
            SplitBuddyError::NotOwner { .. } => "errors.not_owner",
            SplitBuddyError::PermissionDenied(_) => "errors.permission_denied",
            SplitBuddyError::NoActiveMembers { .. } => "errors.no_active_members",
            SplitBuddyError::DialogPreconditionFailed(_) => "dialog.something_wrong",
            _ => "errors.generic",
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
