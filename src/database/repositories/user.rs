//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, UserId, UpsertUser};
use crate::utils::errors::SplitBuddyError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user or refresh its display fields
    pub async fn upsert(&self, request: UpsertUser) -> Result<User, SplitBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, display_name, handle, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                handle = EXCLUDED.handle,
                updated_at = EXCLUDED.updated_at
            RETURNING id, display_name, handle, created_at, updated_at
            "#
        )
        .bind(request.id)
        .bind(request.display_name)
        .bind(request.handle)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, SplitBuddyError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, display_name, handle, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
