//! Event router
//!
//! Turns inbound events into service calls and replies. Every event first
//! registers its sender (and, in groups, the group and the membership). The
//! edit dialog gets the first look at option signals and free text; whatever
//! it leaves goes to the regular command handling.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::event::{ChatMemberState, EventKind, InboundEvent};
use super::reply::{Line, Outbound, ParamValue, Reply, ReplyOption};
use super::serializer::EventHandler;
use crate::config::DialogConfig;
use crate::models::{ExpenseChanges, GroupId, MemberStatus, MemberView, UserId};
use crate::services::{ExpenseService, MembershipService, ServiceFactory};
use crate::state::{ConversationContext, DialogInput, EditDialog};
use crate::utils::errors::{ErrorSeverity, Result, SplitBuddyError};
use crate::utils::helpers::{parse_add_args, split_command};

pub const SIGNAL_EDIT_EXPENSE: &str = "edit_exp";
pub const SIGNAL_DELETE_EXPENSE: &str = "delete_exp";
pub const SIGNAL_ACTIVATE_MEMBER: &str = "activate_member";
pub const SIGNAL_DEACTIVATE_MEMBER: &str = "deactivate_member";

/// Signal carrying a numeric argument, e.g. `edit_exp:42`
pub fn signal_with_id(name: &str, id: i64) -> String {
    format!("{name}:{id}")
}

#[derive(Clone)]
pub struct Router {
    expenses: ExpenseService,
    membership: MembershipService,
    dialog: EditDialog,
}

impl Router {
    pub fn new(services: &ServiceFactory, dialog_config: &DialogConfig) -> Self {
        let expenses = services.expense_service.clone();
        let membership = services.membership_service.clone();
        let dialog = EditDialog::new(expenses.clone(), membership.clone(), dialog_config);
        Self {
            expenses,
            membership,
            dialog,
        }
    }

    async fn route(
        &self,
        event: &InboundEvent,
        session: &mut ConversationContext,
    ) -> Result<Vec<Outbound>> {
        self.register(event).await?;

        let chat_id = event.chat.id;
        match &event.kind {
            EventKind::Start => Ok(vec![Outbound::send("start")]),
            EventKind::Help => Ok(vec![Outbound::send("help")]),
            EventKind::MembershipChanged {
                new_status,
                previous_status,
            } => Ok(self.bot_membership_changed(event, *new_status, *previous_status)),
            EventKind::Text { text } => self.text(event, session, text).await,
            _ if !event.chat.is_group => Ok(vec![Outbound::send("group_only")]),
            EventKind::Add {
                raw_args,
                message_id,
            } => self.add(chat_id, require_actor(event)?, raw_args, *message_id).await,
            EventKind::Delete { replied_message_id } => match replied_message_id {
                Some(message_id) => self.delete(chat_id, require_actor(event)?, *message_id).await,
                None => Ok(vec![Outbound::send("delete_usage")]),
            },
            EventKind::Transactions => self.transactions(chat_id).await,
            EventKind::Balance => self.balance(chat_id).await,
            EventKind::Members => Ok(vec![Outbound::Send(self.members(chat_id).await?)]),
            EventKind::Currency { raw_args } => self.currency(chat_id, raw_args).await,
            EventKind::MessageEdited { message_id, text } => {
                self.message_edited(chat_id, require_actor(event)?, *message_id, text)
                    .await
            }
            EventKind::Callback { signal } => {
                self.signal(chat_id, require_actor(event)?, session, signal)
                    .await
            }
        }
    }

    /// Record the sender, and in groups the group and the membership
    async fn register(&self, event: &InboundEvent) -> Result<()> {
        if let Some(actor) = &event.actor {
            self.membership.register_user(actor.to_upsert()).await?;
        }

        if !event.chat.is_group {
            return Ok(());
        }
        if let EventKind::MembershipChanged { new_status, .. } = &event.kind {
            if !new_status.is_present() {
                return Ok(());
            }
        }

        let title = event.chat.title.as_deref().unwrap_or_default();
        self.membership.ensure_group(event.chat.id, title).await?;
        if let Some(actor) = &event.actor {
            self.membership.ensure_membership(actor.id, event.chat.id).await?;
        }
        Ok(())
    }

    fn bot_membership_changed(
        &self,
        event: &InboundEvent,
        new_status: ChatMemberState,
        previous_status: ChatMemberState,
    ) -> Vec<Outbound> {
        info!(
            chat_id = event.chat.id,
            new_status = ?new_status,
            previous_status = ?previous_status,
            "Bot membership changed"
        );

        if event.chat.is_group && new_status.is_present() && !previous_status.is_present() {
            vec![Outbound::send("welcome")]
        } else {
            Vec::new()
        }
    }

    async fn text(
        &self,
        event: &InboundEvent,
        session: &mut ConversationContext,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        if let Some(actor_id) = event.actor_id() {
            if let Some(outbound) = self
                .dialog
                .resume(session, actor_id, DialogInput::Text(text))
                .await?
            {
                return Ok(outbound);
            }
        }

        // Group chatter is none of our business
        if event.chat.is_group {
            Ok(Vec::new())
        } else {
            Ok(vec![Outbound::send("unknown")])
        }
    }

    async fn add(
        &self,
        chat_id: GroupId,
        actor_id: UserId,
        raw_args: &str,
        message_id: i64,
    ) -> Result<Vec<Outbound>> {
        let Ok((amount, description)) = parse_add_args(raw_args) else {
            return Ok(vec![Outbound::send("add_usage")]);
        };

        let expense = self
            .expenses
            .create(chat_id, actor_id, amount, &description, message_id)
            .await?;
        let currency = self.membership.group_currency(chat_id).await?;

        Ok(vec![Outbound::Send(
            Reply::new("expense_added")
                .amount("amount", expense.amount, currency)
                .text("description", expense.description)
                .param("count", ParamValue::Number(expense.participants.len() as i64)),
        )])
    }

    async fn delete(&self, chat_id: GroupId, actor_id: UserId, message_id: i64) -> Result<Vec<Outbound>> {
        let expense = self
            .expenses
            .delete_by_message(chat_id, message_id, actor_id)
            .await?;
        let currency = self.membership.group_currency(chat_id).await?;

        Ok(vec![Outbound::Send(
            Reply::new("expense_deleted")
                .amount("amount", expense.amount, currency)
                .text("description", expense.description),
        )])
    }

    async fn message_edited(
        &self,
        chat_id: GroupId,
        actor_id: UserId,
        message_id: i64,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let Some((command, args)) = split_command(text) else {
            return Ok(Vec::new());
        };
        if command != "add" {
            debug!(chat_id = chat_id, message_id = message_id, "Ignoring edit of a non-expense message");
            return Ok(Vec::new());
        }

        let Ok((amount, description)) = parse_add_args(&args) else {
            return Ok(vec![Outbound::send("add_usage")]);
        };
        let changes = ExpenseChanges {
            amount: Some(amount),
            description: Some(description),
        };

        let expense = self
            .expenses
            .update_by_message(chat_id, message_id, changes, actor_id)
            .await?;
        let currency = self.membership.group_currency(chat_id).await?;

        Ok(vec![Outbound::Send(
            Reply::new("expense_updated")
                .amount("amount", expense.amount, currency)
                .text("description", expense.description),
        )])
    }

    async fn transactions(&self, chat_id: GroupId) -> Result<Vec<Outbound>> {
        let expenses = self.expenses.list(chat_id).await?;
        if expenses.is_empty() {
            return Ok(vec![Outbound::send("transactions.empty")]);
        }

        let currency = self.membership.group_currency(chat_id).await?;
        let mut reply = Reply::new("transactions.header");
        for (index, expense) in expenses.into_iter().enumerate() {
            let number = ParamValue::Number(index as i64 + 1);
            reply = reply
                .line(
                    Line::new("transactions.line")
                        .param("number", number.clone())
                        .param(
                            "amount",
                            ParamValue::Amount {
                                minor: expense.amount,
                                currency: currency.clone(),
                            },
                        )
                        .text("description", expense.description)
                        .text("payer", expense.payer_name)
                        .param("date", ParamValue::Timestamp(expense.created_at)),
                )
                .option_row(vec![
                    ReplyOption::new("options.edit_numbered", signal_with_id(SIGNAL_EDIT_EXPENSE, expense.id))
                        .param("number", number.clone()),
                    ReplyOption::new("options.delete_numbered", signal_with_id(SIGNAL_DELETE_EXPENSE, expense.id))
                        .param("number", number),
                ]);
        }

        Ok(vec![Outbound::Send(reply)])
    }

    async fn balance(&self, chat_id: GroupId) -> Result<Vec<Outbound>> {
        let transfers = self.expenses.balance(chat_id).await?;
        if transfers.is_empty() {
            return Ok(vec![Outbound::send("balance.settled")]);
        }

        let currency = self.membership.group_currency(chat_id).await?;
        let names: HashMap<UserId, String> = self
            .membership
            .list_members(chat_id)
            .await?
            .iter()
            .map(|member| (member.user_id, member.label()))
            .collect();
        let name = |id: UserId| names.get(&id).cloned().unwrap_or_else(|| id.to_string());

        let reply = transfers.iter().fold(Reply::new("balance.header"), |reply, transfer| {
            reply.line(
                Line::new("balance.line")
                    .text("from", name(transfer.from))
                    .text("to", name(transfer.to))
                    .param(
                        "amount",
                        ParamValue::Amount {
                            minor: transfer.amount,
                            currency: currency.clone(),
                        },
                    ),
            )
        });

        Ok(vec![Outbound::Send(reply)])
    }

    async fn members(&self, chat_id: GroupId) -> Result<Reply> {
        let members = self.membership.list_members(chat_id).await?;
        Ok(members.iter().fold(Reply::new("members.header"), |reply, member| {
            reply
                .line(member_line(member))
                .option_row(vec![member_toggle(member)])
        }))
    }

    async fn currency(&self, chat_id: GroupId, raw_args: &str) -> Result<Vec<Outbound>> {
        let code = raw_args.trim();
        if code.is_empty() {
            let current = self.membership.group_currency(chat_id).await?;
            return Ok(vec![Outbound::Send(
                Reply::new("currency.current").text("currency", current),
            )]);
        }

        match self.membership.set_currency(chat_id, code).await {
            Ok(group) => Ok(vec![Outbound::Send(
                Reply::new("currency.set").text("currency", group.currency),
            )]),
            Err(SplitBuddyError::Validation(_)) => Ok(vec![Outbound::send("currency.usage")]),
            Err(e) => Err(e),
        }
    }

    async fn signal(
        &self,
        chat_id: GroupId,
        actor_id: UserId,
        session: &mut ConversationContext,
        signal: &str,
    ) -> Result<Vec<Outbound>> {
        if let Some(outbound) = self
            .dialog
            .resume(session, actor_id, DialogInput::Signal(signal))
            .await?
        {
            return Ok(outbound);
        }

        if EditDialog::is_dialog_signal(signal) {
            // Options of a dialog that is gone, or of someone else's dialog
            if session.step.is_some() && session.requester_id != Some(actor_id) {
                return Err(SplitBuddyError::PermissionDenied(
                    "edit dialog belongs to another user".to_string(),
                ));
            }
            return Err(SplitBuddyError::DialogPreconditionFailed(
                "no edit dialog in progress".to_string(),
            ));
        }

        let Some((name, argument)) = signal.split_once(':') else {
            warn!(chat_id = chat_id, signal = signal, "Unknown signal");
            return Ok(Vec::new());
        };
        let id: i64 = argument
            .parse()
            .map_err(|_| SplitBuddyError::Validation(format!("malformed signal: {signal}")))?;

        match name {
            SIGNAL_EDIT_EXPENSE => self.dialog.begin(session, id, actor_id).await,
            SIGNAL_DELETE_EXPENSE => {
                let expense = self.expenses.delete_by_id(chat_id, id, actor_id).await?;
                let currency = self.membership.group_currency(chat_id).await?;
                Ok(vec![Outbound::Send(
                    Reply::new("expense_deleted")
                        .amount("amount", expense.amount, currency)
                        .text("description", expense.description),
                )])
            }
            SIGNAL_ACTIVATE_MEMBER | SIGNAL_DEACTIVATE_MEMBER => {
                let status = if name == SIGNAL_ACTIVATE_MEMBER {
                    MemberStatus::Active
                } else {
                    MemberStatus::Inactive
                };
                self.membership
                    .set_status(id, chat_id, status, Some(actor_id))
                    .await?;
                Ok(vec![Outbound::EditOrigin(self.members(chat_id).await?)])
            }
            _ => {
                warn!(chat_id = chat_id, signal = signal, "Unknown signal");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl EventHandler for Router {
    async fn handle(
        &self,
        event: InboundEvent,
        session: &mut ConversationContext,
    ) -> Result<Vec<Outbound>> {
        info!(
            chat_id = event.chat.id,
            user_id = event.actor_id(),
            event = event.kind.name(),
            "Handling event"
        );

        match self.route(&event, session).await {
            Ok(outbound) => Ok(outbound),
            Err(e) => {
                match e.severity() {
                    ErrorSeverity::Info => info!(chat_id = event.chat.id, error = %e, "Request rejected"),
                    ErrorSeverity::Warning => warn!(chat_id = event.chat.id, error = %e, "Request rejected"),
                    _ => error!(chat_id = event.chat.id, error = %e, "Request failed"),
                }
                Ok(vec![Outbound::send(e.reply_key())])
            }
        }
    }
}

fn require_actor(event: &InboundEvent) -> Result<UserId> {
    event
        .actor_id()
        .ok_or_else(|| SplitBuddyError::PermissionDenied("anonymous sender".to_string()))
}

fn member_line(member: &MemberView) -> Line {
    let key = if member.is_active() {
        "members.line_active"
    } else {
        "members.line_inactive"
    };
    Line::new(key).text("name", member.label())
}

fn member_toggle(member: &MemberView) -> ReplyOption {
    let (label, signal) = if member.is_active() {
        ("options.deactivate", SIGNAL_DEACTIVATE_MEMBER)
    } else {
        ("options.activate", SIGNAL_ACTIVATE_MEMBER)
    };
    ReplyOption::new(label, signal_with_id(signal, member.user_id))
        .param("name", ParamValue::Text(member.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_with_id() {
        assert_eq!(signal_with_id(SIGNAL_EDIT_EXPENSE, 42), "edit_exp:42");
        assert_eq!(signal_with_id(SIGNAL_ACTIVATE_MEMBER, -7), "activate_member:-7");
    }
}
