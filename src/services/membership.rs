//! Membership service
//!
//! Tracks who belongs to a group and who is charged for new expenses.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::database::LedgerStore;
use crate::models::{Group, GroupId, GroupMember, MemberStatus, MemberView, UpsertUser, User, UserId};
use crate::utils::errors::{Result, SplitBuddyError};
use crate::utils::helpers::is_valid_currency_code;
use crate::utils::logging::log_member_action;

#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn LedgerStore>,
    config: LedgerConfig,
}

impl MembershipService {
    pub fn new(store: Arc<dyn LedgerStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Record a user seen by the bot; display fields follow the latest sighting
    pub async fn register_user(&self, user: UpsertUser) -> Result<User> {
        debug!(user_id = user.id, "Registering user");
        self.store.upsert_user(user).await
    }

    /// Idempotent group upsert; a new group starts with the default currency
    pub async fn ensure_group(&self, group_id: GroupId, title: &str) -> Result<Group> {
        debug!(group_id = group_id, "Ensuring group");
        self.store
            .upsert_group(group_id, title, &self.config.default_currency)
            .await
    }

    /// Idempotent membership upsert. New members start ACTIVE and an
    /// existing member keeps whatever status it has.
    pub async fn ensure_membership(&self, user_id: UserId, group_id: GroupId) -> Result<GroupMember> {
        self.store.ensure_member(user_id, group_id).await
    }

    /// Explicit toggle from member management
    pub async fn set_status(
        &self,
        user_id: UserId,
        group_id: GroupId,
        status: MemberStatus,
        actor_id: Option<UserId>,
    ) -> Result<GroupMember> {
        let member = self
            .store
            .set_member_status(user_id, group_id, status)
            .await?
            .ok_or_else(|| {
                SplitBuddyError::NotFound(format!("user {user_id} is not a member of group {group_id}"))
            })?;

        log_member_action(group_id, user_id, status.as_str(), actor_id);
        Ok(member)
    }

    /// Live ACTIVE set in join order
    pub async fn active_members(&self, group_id: GroupId) -> Result<Vec<UserId>> {
        self.store.active_member_ids(group_id).await
    }

    pub async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberView>> {
        self.store.list_members(group_id).await
    }

    /// The group's currency, falling back to the configured default
    pub async fn group_currency(&self, group_id: GroupId) -> Result<String> {
        Ok(self
            .store
            .find_group(group_id)
            .await?
            .map(|group| group.currency)
            .unwrap_or_else(|| self.config.default_currency.clone()))
    }

    /// Switch the group's currency; only the display symbol changes, amounts are kept
    pub async fn set_currency(&self, group_id: GroupId, code: &str) -> Result<Group> {
        let code = code.trim().to_ascii_uppercase();
        if !is_valid_currency_code(&code) {
            return Err(SplitBuddyError::Validation(format!("invalid currency code: {code}")));
        }

        let group = self
            .store
            .set_group_currency(group_id, &code)
            .await?
            .ok_or_else(|| SplitBuddyError::NotFound(format!("group {group_id}")))?;

        info!(group_id = group_id, currency = %group.currency, "Group currency changed");
        Ok(group)
    }
}
