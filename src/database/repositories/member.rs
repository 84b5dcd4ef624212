//! Group membership repository implementation
//!
//! Membership rows are never deleted; leaving a group is a status flip.

use sqlx::{FromRow, PgPool};
use chrono::{DateTime, Utc};
use crate::models::group::{GroupId, GroupMember, MemberStatus, MemberView};
use crate::models::user::UserId;
use crate::utils::errors::SplitBuddyError;

#[derive(Debug, FromRow)]
struct MemberRow {
    user_id: i64,
    group_id: i64,
    status: String,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for GroupMember {
    type Error = SplitBuddyError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(GroupMember {
            user_id: row.user_id,
            group_id: row.group_id,
            status: row.status.parse()?,
            joined_at: row.joined_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberViewRow {
    user_id: i64,
    display_name: String,
    handle: Option<String>,
    status: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MemberViewRow> for MemberView {
    type Error = SplitBuddyError;

    fn try_from(row: MemberViewRow) -> Result<Self, Self::Error> {
        Ok(MemberView {
            user_id: row.user_id,
            display_name: row.display_name,
            handle: row.handle,
            status: row.status.parse()?,
            joined_at: row.joined_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an active membership unless one already exists
    pub async fn ensure(&self, user_id: UserId, group_id: GroupId) -> Result<GroupMember, SplitBuddyError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO group_members (user_id, group_id, status, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (user_id, group_id) DO NOTHING
            "#
        )
        .bind(user_id)
        .bind(group_id)
        .bind(MemberStatus::Active.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT user_id, group_id, status, joined_at, updated_at FROM group_members WHERE user_id = $1 AND group_id = $2"
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Flip a member's status
    pub async fn set_status(&self, user_id: UserId, group_id: GroupId, status: MemberStatus) -> Result<Option<GroupMember>, SplitBuddyError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            UPDATE group_members
            SET status = $3, updated_at = $4
            WHERE user_id = $1 AND group_id = $2
            RETURNING user_id, group_id, status, joined_at, updated_at
            "#
        )
        .bind(user_id)
        .bind(group_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(GroupMember::try_from).transpose()
    }

    /// Get group members with their identities
    pub async fn list_with_users(&self, group_id: GroupId) -> Result<Vec<MemberView>, SplitBuddyError> {
        let rows = sqlx::query_as::<_, MemberViewRow>(
            r#"
            SELECT gm.user_id, u.display_name, u.handle, gm.status, gm.joined_at
            FROM group_members gm
            INNER JOIN users u ON u.id = gm.user_id
            WHERE gm.group_id = $1
            ORDER BY gm.join_seq ASC
            "#
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MemberView::try_from).collect()
    }

    /// Ids of currently active members
    pub async fn active_user_ids(&self, group_id: GroupId) -> Result<Vec<UserId>, SplitBuddyError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM group_members WHERE group_id = $1 AND status = $2 ORDER BY join_seq ASC"
        )
        .bind(group_id)
        .bind(MemberStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
