//! SplitBuddy Telegram Bot
//!
//! A Telegram bot that records shared expenses inside group chats and
//! settles them with the fewest transfers. The library exposes the ledger,
//! the edit dialog, the per-chat dispatch serializer and the Telegram bridge.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod dispatch;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{SplitBuddyError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, LedgerStore, MemoryLedger};
pub use dispatch::{DispatchSerializer, Router};
pub use services::ServiceFactory;
pub use state::{EditDialog, SessionStorage};
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
