//! Group repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::group::{Group, GroupId};
use crate::utils::errors::SplitBuddyError;

#[derive(Clone, Debug)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a group or refresh the title of an existing one
    pub async fn upsert(&self, id: GroupId, title: &str, default_currency: &str) -> Result<Group, SplitBuddyError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (id, title, currency, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                updated_at = CASE WHEN groups.title = EXCLUDED.title THEN groups.updated_at ELSE EXCLUDED.updated_at END
            RETURNING id, title, currency, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(title)
        .bind(default_currency)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find group by ID
    pub async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, SplitBuddyError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, currency, created_at, updated_at FROM groups WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Change the currency a group's amounts are shown in
    pub async fn set_currency(&self, id: GroupId, currency: &str) -> Result<Option<Group>, SplitBuddyError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET currency = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, title, currency, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(currency)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }
}
