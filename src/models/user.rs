//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Opaque numeric identity supplied by the transport
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Last-seen identity of a user; applied with upsert semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertUser {
    pub id: UserId,
    pub display_name: String,
    pub handle: Option<String>,
}

impl User {
    /// Name used when presenting the user, preferring the handle
    pub fn label(&self) -> String {
        match &self.handle {
            Some(handle) => format!("@{handle}"),
            None => self.display_name.clone(),
        }
    }
}
