//! Internationalization module
//!
//! This module handles multi-language support for the SplitBuddy bot.
//! It provides translation loading, language detection, message formatting,
//! pluralization, and rendering of structured replies.

pub mod loader;
pub mod render;

// Re-export commonly used i18n components
pub use loader::{I18n, TranslationParams, TranslationStats, LanguageStats};
pub use render::{render_line, render_option_label, render_reply};
