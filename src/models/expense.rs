//! Expense model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::group::GroupId;
use super::user::UserId;

pub type ExpenseId = i64;

/// A paid expense and the participants frozen at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub payer_id: UserId,
    /// Amount in minor units, always positive
    pub amount: i64,
    pub description: String,
    /// Chat-local identity of the message that created the expense
    pub message_id: i64,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<UserId>,
}

/// Expense joined with its payer for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseView {
    pub id: ExpenseId,
    pub amount: i64,
    pub description: String,
    pub message_id: i64,
    pub created_at: DateTime<Utc>,
    pub payer_id: UserId,
    pub payer_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub group_id: GroupId,
    pub payer_id: UserId,
    pub amount: i64,
    pub description: String,
    pub message_id: i64,
    pub participants: Vec<UserId>,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseChanges {
    pub amount: Option<i64>,
    pub description: Option<String>,
}

impl ExpenseChanges {
    pub fn amount(amount: i64) -> Self {
        Self { amount: Some(amount), description: None }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self { amount: None, description: Some(description.into()) }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.description.is_none()
    }
}
