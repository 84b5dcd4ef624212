//! Group and membership models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::user::UserId;
use crate::utils::errors::SplitBuddyError;

/// One group per chat; the chat identity is the group identity
pub type GroupId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether a member is charged a share of new expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = SplitBuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            other => Err(SplitBuddyError::Validation(format!("unknown member status: {other}"))),
        }
    }
}

/// Membership row; unique per (user, group) and never deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership joined with the member's identity, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub user_id: UserId,
    pub display_name: String,
    pub handle: Option<String>,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl MemberView {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn label(&self) -> String {
        match &self.handle {
            Some(handle) => format!("@{handle}"),
            None => self.display_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_status_parsing() {
        assert_eq!("active".parse::<MemberStatus>().unwrap(), MemberStatus::Active);
        assert_eq!("inactive".parse::<MemberStatus>().unwrap(), MemberStatus::Inactive);
        assert!("banned".parse::<MemberStatus>().is_err());
        assert_eq!(MemberStatus::Inactive.to_string(), "inactive");
    }
}
