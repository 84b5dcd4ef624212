//! State management module
//!
//! This module handles per-chat conversation state and the edit dialog

pub mod context;
pub mod dialog;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, DialogStep};
pub use dialog::{DialogInput, EditDialog};
pub use storage::{MemorySessionStorage, RedisSessionStorage, SessionStorage};
