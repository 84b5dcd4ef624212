//! Bot handlers module
//!
//! Bridges Telegram updates to the dispatch layer and renders its effects
//! back through the Bot API.

pub mod telegram;

pub use telegram::{register_commands, schema};
