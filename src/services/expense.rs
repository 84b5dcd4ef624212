//! Expense lifecycle
//!
//! Creates, edits and deletes expenses. Only the payer may touch an expense
//! after creation, and the participant set is frozen from the ACTIVE members
//! at the moment it is recorded.

use std::sync::Arc;

use tracing::debug;

use super::balance::{settle, Transfer};
use crate::config::LedgerConfig;
use crate::database::LedgerStore;
use crate::models::{Expense, ExpenseChanges, ExpenseId, ExpenseView, GroupId, NewExpense, UserId};
use crate::utils::errors::{Result, SplitBuddyError};
use crate::utils::helpers::MAX_AMOUNT;
use crate::utils::logging::log_expense_action;

#[derive(Clone)]
pub struct ExpenseService {
    store: Arc<dyn LedgerStore>,
    config: LedgerConfig,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn LedgerStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Record a new expense split among the group's currently active members
    pub async fn create(
        &self,
        group_id: GroupId,
        payer_id: UserId,
        amount: i64,
        description: &str,
        message_id: i64,
    ) -> Result<Expense> {
        validate_amount(amount)?;
        let description = validate_description(description)?;

        if self.store.find_group(group_id).await?.is_none() {
            return Err(SplitBuddyError::NotFound(format!("group {group_id}")));
        }

        let participants = self.store.active_member_ids(group_id).await?;
        if participants.is_empty() {
            return Err(SplitBuddyError::NoActiveMembers { group_id });
        }

        let expense = self
            .store
            .insert_expense(NewExpense {
                group_id,
                payer_id,
                amount,
                description,
                message_id,
                participants,
            })
            .await?;

        log_expense_action(group_id, expense.id, "created", payer_id);
        Ok(expense)
    }

    /// Apply an edit of the message that created an expense
    pub async fn update_by_message(
        &self,
        group_id: GroupId,
        message_id: i64,
        changes: ExpenseChanges,
        requester_id: UserId,
    ) -> Result<Expense> {
        let expense = self
            .store
            .find_expense_by_message(group_id, message_id)
            .await?
            .ok_or(SplitBuddyError::NotAnExpense { message_id })?;

        self.apply(expense, changes, requester_id).await
    }

    /// Edit an expense by identity, e.g. from the edit dialog
    pub async fn update_by_id(
        &self,
        group_id: GroupId,
        id: ExpenseId,
        changes: ExpenseChanges,
        requester_id: UserId,
    ) -> Result<Expense> {
        let expense = self.get(group_id, id).await?;
        self.apply(expense, changes, requester_id).await
    }

    pub async fn delete_by_message(
        &self,
        group_id: GroupId,
        message_id: i64,
        requester_id: UserId,
    ) -> Result<Expense> {
        let expense = self
            .store
            .find_expense_by_message(group_id, message_id)
            .await?
            .ok_or(SplitBuddyError::NotAnExpense { message_id })?;

        self.remove(expense, requester_id).await
    }

    pub async fn delete_by_id(
        &self,
        group_id: GroupId,
        id: ExpenseId,
        requester_id: UserId,
    ) -> Result<Expense> {
        let expense = self.get(group_id, id).await?;
        self.remove(expense, requester_id).await
    }

    /// Look up an expense that belongs to `group_id`
    pub async fn get(&self, group_id: GroupId, id: ExpenseId) -> Result<Expense> {
        self.store
            .find_expense(id)
            .await?
            .filter(|expense| expense.group_id == group_id)
            .ok_or_else(|| SplitBuddyError::NotFound(format!("expense {id}")))
    }

    /// Newest expenses first, capped at the configured list size
    pub async fn list(&self, group_id: GroupId) -> Result<Vec<ExpenseView>> {
        self.store.list_expenses(group_id, self.config.list_limit).await
    }

    /// Settle-up transfers for everything recorded in the group
    pub async fn balance(&self, group_id: GroupId) -> Result<Vec<Transfer>> {
        let expenses = self.store.group_expenses(group_id).await?;
        debug!(group_id = group_id, expenses = expenses.len(), "Computing balance");
        settle(&expenses)
    }

    async fn apply(
        &self,
        expense: Expense,
        changes: ExpenseChanges,
        requester_id: UserId,
    ) -> Result<Expense> {
        ensure_owner(&expense, requester_id)?;

        let changes = ExpenseChanges {
            amount: changes.amount.map(validate_amount).transpose()?,
            description: changes
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
        };
        if changes.is_empty() {
            return Ok(expense);
        }

        // The row can vanish between the lookup and the write
        let updated = self
            .store
            .update_expense(expense.id, changes)
            .await?
            .ok_or_else(|| SplitBuddyError::NotFound(format!("expense {}", expense.id)))?;

        log_expense_action(updated.group_id, updated.id, "updated", requester_id);
        Ok(updated)
    }

    async fn remove(&self, expense: Expense, requester_id: UserId) -> Result<Expense> {
        ensure_owner(&expense, requester_id)?;

        if !self.store.delete_expense(expense.id).await? {
            return Err(SplitBuddyError::NotFound(format!("expense {}", expense.id)));
        }

        log_expense_action(expense.group_id, expense.id, "deleted", requester_id);
        Ok(expense)
    }
}

fn ensure_owner(expense: &Expense, requester_id: UserId) -> Result<()> {
    if expense.payer_id != requester_id {
        return Err(SplitBuddyError::NotOwner { expense_id: expense.id });
    }
    Ok(())
}

fn validate_amount(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(SplitBuddyError::Validation(format!("amount must be positive, got {amount}")));
    }
    if amount > MAX_AMOUNT {
        return Err(SplitBuddyError::Validation(format!("amount {amount} exceeds {MAX_AMOUNT}")));
    }
    Ok(amount)
}

fn validate_description(description: &str) -> Result<String> {
    if description.trim().is_empty() {
        return Err(SplitBuddyError::Validation("description is empty".to_string()));
    }
    Ok(description.to_string())
}
