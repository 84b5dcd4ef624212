//! Ledger store contract
//!
//! Everything the expense and membership services need from durable storage.
//! Each method is atomic on its own; no cross-call transactions are offered.

use async_trait::async_trait;

use crate::models::{
    Expense, ExpenseChanges, ExpenseId, ExpenseView, Group, GroupId, GroupMember, MemberStatus,
    MemberView, NewExpense, UpsertUser, User, UserId,
};
use crate::utils::errors::Result;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a user or overwrite its display fields (last seen wins)
    async fn upsert_user(&self, user: UpsertUser) -> Result<User>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    /// Insert a group with `default_currency`, or refresh the title of an existing one
    async fn upsert_group(&self, id: GroupId, title: &str, default_currency: &str) -> Result<Group>;

    async fn find_group(&self, id: GroupId) -> Result<Option<Group>>;

    async fn set_group_currency(&self, id: GroupId, currency: &str) -> Result<Option<Group>>;

    /// Insert an ACTIVE membership if none exists; an existing row is returned untouched
    async fn ensure_member(&self, user_id: UserId, group_id: GroupId) -> Result<GroupMember>;

    async fn set_member_status(
        &self,
        user_id: UserId,
        group_id: GroupId,
        status: MemberStatus,
    ) -> Result<Option<GroupMember>>;

    /// All members of a group ordered by join time
    async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberView>>;

    /// Currently active members ordered by join time
    async fn active_member_ids(&self, group_id: GroupId) -> Result<Vec<UserId>>;

    /// Persist an expense and its participant set in one write
    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense>;

    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>>;

    async fn find_expense_by_message(
        &self,
        group_id: GroupId,
        message_id: i64,
    ) -> Result<Option<Expense>>;

    async fn update_expense(&self, id: ExpenseId, changes: ExpenseChanges) -> Result<Option<Expense>>;

    /// Hard delete; returns whether a row was removed
    async fn delete_expense(&self, id: ExpenseId) -> Result<bool>;

    /// Newest first, joined with the payer
    async fn list_expenses(&self, group_id: GroupId, limit: i64) -> Result<Vec<ExpenseView>>;

    /// Every expense of a group with participants, oldest first
    async fn group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>>;
}
