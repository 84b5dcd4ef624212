//! Expense repository implementation

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use chrono::{DateTime, Utc};
use crate::models::expense::{Expense, ExpenseChanges, ExpenseId, ExpenseView, NewExpense};
use crate::models::group::GroupId;
use crate::models::user::UserId;
use crate::utils::errors::SplitBuddyError;

#[derive(Debug, FromRow)]
struct ExpenseRow {
    id: i64,
    group_id: i64,
    payer_id: i64,
    amount: i64,
    description: String,
    message_id: i64,
    created_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn with_participants(self, participants: Vec<UserId>) -> Expense {
        Expense {
            id: self.id,
            group_id: self.group_id,
            payer_id: self.payer_id,
            amount: self.amount,
            description: self.description,
            message_id: self.message_id,
            created_at: self.created_at,
            participants,
        }
    }
}

#[derive(Debug, FromRow)]
struct ExpenseViewRow {
    id: i64,
    amount: i64,
    description: String,
    message_id: i64,
    created_at: DateTime<Utc>,
    payer_id: i64,
    payer_name: String,
    payer_handle: Option<String>,
}

impl From<ExpenseViewRow> for ExpenseView {
    fn from(row: ExpenseViewRow) -> Self {
        ExpenseView {
            id: row.id,
            amount: row.amount,
            description: row.description,
            message_id: row.message_id,
            created_at: row.created_at,
            payer_id: row.payer_id,
            payer_name: match row.payer_handle {
                Some(handle) => format!("@{handle}"),
                None => row.payer_name,
            },
        }
    }
}

const EXPENSE_COLUMNS: &str = "id, group_id, payer_id, amount, description, message_id, created_at";

#[derive(Clone, Debug)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an expense and its participants in one transaction
    pub async fn insert(&self, request: NewExpense) -> Result<Expense, SplitBuddyError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            INSERT INTO expenses (group_id, payer_id, amount, description, message_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (group_id, message_id) DO NOTHING
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(request.group_id)
        .bind(request.payer_id)
        .bind(request.amount)
        .bind(&request.description)
        .bind(request.message_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| SplitBuddyError::Validation(format!(
            "message {} already recorded an expense",
            request.message_id
        )))?;

        for (position, user_id) in request.participants.iter().enumerate() {
            sqlx::query(
                "INSERT INTO expense_participants (expense_id, user_id, position) VALUES ($1, $2, $3)"
            )
            .bind(row.id)
            .bind(user_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row.with_participants(request.participants))
    }

    /// Find expense by ID
    pub async fn find_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, SplitBuddyError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_participants(row).await
    }

    /// Find the expense created by a chat message
    pub async fn find_by_message(&self, group_id: GroupId, message_id: i64) -> Result<Option<Expense>, SplitBuddyError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE group_id = $1 AND message_id = $2"
        ))
        .bind(group_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_participants(row).await
    }

    /// Update amount and/or description
    pub async fn update(&self, id: ExpenseId, changes: ExpenseChanges) -> Result<Option<Expense>, SplitBuddyError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            UPDATE expenses
            SET amount = COALESCE($2, amount),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.amount)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_participants(row).await
    }

    /// Delete expense; participant links cascade
    pub async fn delete(&self, id: ExpenseId) -> Result<bool, SplitBuddyError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest expenses of a group joined with their payer
    pub async fn list_views(&self, group_id: GroupId, limit: i64) -> Result<Vec<ExpenseView>, SplitBuddyError> {
        let rows = sqlx::query_as::<_, ExpenseViewRow>(
            r#"
            SELECT e.id, e.amount, e.description, e.message_id, e.created_at,
                   e.payer_id, u.display_name AS payer_name, u.handle AS payer_handle
            FROM expenses e
            INNER JOIN users u ON u.id = e.payer_id
            WHERE e.group_id = $1
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT $2
            "#
        )
        .bind(group_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExpenseView::from).collect())
    }

    /// All expenses of a group with participants, oldest first
    pub async fn list_for_group(&self, group_id: GroupId) -> Result<Vec<Expense>, SplitBuddyError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE group_id = $1 ORDER BY id ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        let links: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT ep.expense_id, ep.user_id
            FROM expense_participants ep
            INNER JOIN expenses e ON e.id = ep.expense_id
            WHERE e.group_id = $1
            ORDER BY ep.expense_id ASC, ep.position ASC
            "#
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        let mut participants: HashMap<ExpenseId, Vec<UserId>> = HashMap::new();
        for (expense_id, user_id) in links {
            participants.entry(expense_id).or_default().push(user_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let users = participants.remove(&row.id).unwrap_or_default();
                row.with_participants(users)
            })
            .collect())
    }

    async fn attach_participants(&self, row: Option<ExpenseRow>) -> Result<Option<Expense>, SplitBuddyError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM expense_participants WHERE expense_id = $1 ORDER BY position ASC"
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.with_participants(ids.into_iter().map(|(id,)| id).collect())))
    }
}
