//! In-memory ledger store
//!
//! Same semantics as the Postgres store, kept in process memory. Backs the
//! test suites and `storage.backend = "memory"` deployments.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::store::LedgerStore;
use crate::models::{
    Expense, ExpenseChanges, ExpenseId, ExpenseView, Group, GroupId, GroupMember, MemberStatus,
    MemberView, NewExpense, UpsertUser, User, UserId,
};
use crate::utils::errors::{Result, SplitBuddyError};

#[derive(Debug, Default)]
struct Ledger {
    users: HashMap<UserId, User>,
    groups: HashMap<GroupId, Group>,
    /// Insertion order is join order
    members: Vec<GroupMember>,
    expenses: BTreeMap<ExpenseId, Expense>,
    next_expense_id: ExpenseId,
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: RwLock<Ledger>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn upsert_user(&self, user: UpsertUser) -> Result<User> {
        let mut ledger = self.inner.write().await;
        let now = Utc::now();
        let entry = ledger.users.entry(user.id).or_insert_with(|| User {
            id: user.id,
            display_name: user.display_name.clone(),
            handle: user.handle.clone(),
            created_at: now,
            updated_at: now,
        });
        entry.display_name = user.display_name;
        entry.handle = user.handle;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn upsert_group(&self, id: GroupId, title: &str, default_currency: &str) -> Result<Group> {
        let mut ledger = self.inner.write().await;
        let now = Utc::now();
        let entry = ledger.groups.entry(id).or_insert_with(|| Group {
            id,
            title: title.to_string(),
            currency: default_currency.to_string(),
            created_at: now,
            updated_at: now,
        });
        if entry.title != title {
            entry.title = title.to_string();
            entry.updated_at = now;
        }
        Ok(entry.clone())
    }

    async fn find_group(&self, id: GroupId) -> Result<Option<Group>> {
        Ok(self.inner.read().await.groups.get(&id).cloned())
    }

    async fn set_group_currency(&self, id: GroupId, currency: &str) -> Result<Option<Group>> {
        let mut ledger = self.inner.write().await;
        Ok(ledger.groups.get_mut(&id).map(|group| {
            group.currency = currency.to_string();
            group.updated_at = Utc::now();
            group.clone()
        }))
    }

    async fn ensure_member(&self, user_id: UserId, group_id: GroupId) -> Result<GroupMember> {
        let mut ledger = self.inner.write().await;
        if let Some(existing) = ledger
            .members
            .iter()
            .find(|m| m.user_id == user_id && m.group_id == group_id)
        {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let member = GroupMember {
            user_id,
            group_id,
            status: MemberStatus::Active,
            joined_at: now,
            updated_at: now,
        };
        ledger.members.push(member.clone());
        debug!(user_id = user_id, group_id = group_id, "Inserted membership");
        Ok(member)
    }

    async fn set_member_status(
        &self,
        user_id: UserId,
        group_id: GroupId,
        status: MemberStatus,
    ) -> Result<Option<GroupMember>> {
        let mut ledger = self.inner.write().await;
        Ok(ledger
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id && m.group_id == group_id)
            .map(|member| {
                member.status = status;
                member.updated_at = Utc::now();
                member.clone()
            }))
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberView>> {
        let ledger = self.inner.read().await;
        Ok(ledger
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .filter_map(|m| {
                let user = ledger.users.get(&m.user_id)?;
                Some(MemberView {
                    user_id: m.user_id,
                    display_name: user.display_name.clone(),
                    handle: user.handle.clone(),
                    status: m.status,
                    joined_at: m.joined_at,
                })
            })
            .collect())
    }

    async fn active_member_ids(&self, group_id: GroupId) -> Result<Vec<UserId>> {
        let ledger = self.inner.read().await;
        Ok(ledger
            .members
            .iter()
            .filter(|m| m.group_id == group_id && m.status == MemberStatus::Active)
            .map(|m| m.user_id)
            .collect())
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense> {
        let mut ledger = self.inner.write().await;
        let duplicate = ledger
            .expenses
            .values()
            .any(|e| e.group_id == expense.group_id && e.message_id == expense.message_id);
        if duplicate {
            return Err(SplitBuddyError::Validation(format!(
                "message {} already recorded an expense",
                expense.message_id
            )));
        }

        ledger.next_expense_id += 1;
        let id = ledger.next_expense_id;
        let stored = Expense {
            id,
            group_id: expense.group_id,
            payer_id: expense.payer_id,
            amount: expense.amount,
            description: expense.description,
            message_id: expense.message_id,
            created_at: Utc::now(),
            participants: expense.participants,
        };
        ledger.expenses.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        Ok(self.inner.read().await.expenses.get(&id).cloned())
    }

    async fn find_expense_by_message(
        &self,
        group_id: GroupId,
        message_id: i64,
    ) -> Result<Option<Expense>> {
        let ledger = self.inner.read().await;
        Ok(ledger
            .expenses
            .values()
            .find(|e| e.group_id == group_id && e.message_id == message_id)
            .cloned())
    }

    async fn update_expense(&self, id: ExpenseId, changes: ExpenseChanges) -> Result<Option<Expense>> {
        let mut ledger = self.inner.write().await;
        Ok(ledger.expenses.get_mut(&id).map(|expense| {
            if let Some(amount) = changes.amount {
                expense.amount = amount;
            }
            if let Some(description) = changes.description {
                expense.description = description;
            }
            expense.clone()
        }))
    }

    async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        Ok(self.inner.write().await.expenses.remove(&id).is_some())
    }

    async fn list_expenses(&self, group_id: GroupId, limit: i64) -> Result<Vec<ExpenseView>> {
        let ledger = self.inner.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(ledger
            .expenses
            .values()
            .rev()
            .filter(|e| e.group_id == group_id)
            .take(limit)
            .map(|e| ExpenseView {
                id: e.id,
                amount: e.amount,
                description: e.description.clone(),
                message_id: e.message_id,
                created_at: e.created_at,
                payer_id: e.payer_id,
                payer_name: ledger
                    .users
                    .get(&e.payer_id)
                    .map(User::label)
                    .unwrap_or_else(|| e.payer_id.to_string()),
            })
            .collect())
    }

    async fn group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>> {
        let ledger = self.inner.read().await;
        Ok(ledger
            .expenses
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect())
    }
}
