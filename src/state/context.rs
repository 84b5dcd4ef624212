//! Conversation context management
//!
//! One context per chat. It exists only while an edit dialog is in flight and
//! records which expense is being edited, who asked, and where the dialog is
//! parked between messages.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ExpenseId, UserId};

/// Where a suspended edit dialog waits for its next input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStep {
    AwaitingChoice,
    AwaitingAmount,
    AwaitingDescription,
}

impl DialogStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogStep::AwaitingChoice => "awaiting_choice",
            DialogStep::AwaitingAmount => "awaiting_amount",
            DialogStep::AwaitingDescription => "awaiting_description",
        }
    }
}

impl fmt::Display for DialogStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-chat conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Chat this context belongs to
    pub chat_id: i64,
    /// Expense targeted by the edit dialog
    pub expense_id: Option<ExpenseId>,
    /// User who opened the dialog; only their input resumes it
    pub requester_id: Option<UserId>,
    /// Current dialog position, `None` while idle
    pub step: Option<DialogStep>,
    /// When this context expires
    pub expires_at: Option<DateTime<Utc>>,
    /// When this context was last updated
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create an empty context for a chat
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            expense_id: None,
            requester_id: None,
            step: None,
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Point the context at an expense, superseding any dialog in flight
    pub fn set_target(&mut self, expense_id: ExpenseId, requester_id: UserId) {
        self.expense_id = Some(expense_id);
        self.requester_id = Some(requester_id);
        self.step = None;
        self.expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Park the dialog at `step` for at most `ttl`
    pub fn park(&mut self, step: DialogStep, ttl: Duration) {
        let now = Utc::now();
        self.step = Some(step);
        self.expires_at = Some(now + ttl);
        self.updated_at = now;
    }

    /// Release everything; the context becomes idle
    pub fn clear(&mut self) {
        self.expense_id = None;
        self.requester_id = None;
        self.step = None;
        self.expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Nothing is in flight, so there is nothing worth storing
    pub fn is_idle(&self) -> bool {
        self.expense_id.is_none() && self.step.is_none()
    }

    /// Check if context has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() > expires_at)
    }

    /// Set custom expiry time
    pub fn set_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Seconds left before expiry, if any
    pub fn remaining_seconds(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}
