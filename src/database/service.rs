//! Database service layer
//!
//! Postgres-backed [`LedgerStore`] composed of one repository per table.

use async_trait::async_trait;

use crate::database::{DatabasePool, ExpenseRepository, GroupRepository, LedgerStore, MemberRepository, UserRepository};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub members: MemberRepository,
    pub expenses: ExpenseRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool),
        }
    }
}

#[async_trait]
impl LedgerStore for DatabaseService {
    async fn upsert_user(&self, user: UpsertUser) -> Result<User> {
        self.users.upsert(user).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn upsert_group(&self, id: GroupId, title: &str, default_currency: &str) -> Result<Group> {
        self.groups.upsert(id, title, default_currency).await
    }

    async fn find_group(&self, id: GroupId) -> Result<Option<Group>> {
        self.groups.find_by_id(id).await
    }

    async fn set_group_currency(&self, id: GroupId, currency: &str) -> Result<Option<Group>> {
        self.groups.set_currency(id, currency).await
    }

    async fn ensure_member(&self, user_id: UserId, group_id: GroupId) -> Result<GroupMember> {
        self.members.ensure(user_id, group_id).await
    }

    async fn set_member_status(&self, user_id: UserId, group_id: GroupId, status: MemberStatus) -> Result<Option<GroupMember>> {
        self.members.set_status(user_id, group_id, status).await
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberView>> {
        self.members.list_with_users(group_id).await
    }

    async fn active_member_ids(&self, group_id: GroupId) -> Result<Vec<UserId>> {
        self.members.active_user_ids(group_id).await
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense> {
        self.expenses.insert(expense).await
    }

    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        self.expenses.find_by_id(id).await
    }

    async fn find_expense_by_message(&self, group_id: GroupId, message_id: i64) -> Result<Option<Expense>> {
        self.expenses.find_by_message(group_id, message_id).await
    }

    async fn update_expense(&self, id: ExpenseId, changes: ExpenseChanges) -> Result<Option<Expense>> {
        self.expenses.update(id, changes).await
    }

    async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        self.expenses.delete(id).await
    }

    async fn list_expenses(&self, group_id: GroupId, limit: i64) -> Result<Vec<ExpenseView>> {
        self.expenses.list_views(group_id, limit).await
    }

    async fn group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>> {
        self.expenses.list_for_group(group_id).await
    }
}
