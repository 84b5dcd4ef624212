//! Expense edit dialog
//!
//! A guided multi-turn edit of one expense. Between turns the dialog lives
//! only in the chat's [`ConversationContext`]: every inbound event loads the
//! context, advances it by at most one step and stores it again.
//!
//! ```text
//! idle -> awaiting_choice -> awaiting_amount      -> idle
//!                         -> awaiting_description -> idle
//!                         -> cancelled
//! ```
//!
//! While parked the dialog only listens to its requester, in its chat, and
//! only to the input its step expects. Anything else is left to the router.

use chrono::Duration;

use super::context::{ConversationContext, DialogStep};
use crate::config::DialogConfig;
use crate::dispatch::reply::{Outbound, Reply, ReplyOption};
use crate::models::{ExpenseChanges, ExpenseId, UserId};
use crate::services::{ExpenseService, MembershipService};
use crate::utils::errors::{Result, SplitBuddyError};
use crate::utils::helpers::parse_amount;
use crate::utils::logging::{log_dialog_transition, log_rejection};

pub const SIGNAL_EDIT_AMOUNT: &str = "edit_amount";
pub const SIGNAL_EDIT_DESCRIPTION: &str = "edit_description";
pub const SIGNAL_CANCEL: &str = "cancel_edit";

/// Upper bound on how long a dialog may stay parked
const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Input offered to a parked dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogInput<'a> {
    Signal(&'a str),
    Text(&'a str),
}

#[derive(Clone)]
pub struct EditDialog {
    expenses: ExpenseService,
    membership: MembershipService,
    ttl: Duration,
}

impl EditDialog {
    pub fn new(expenses: ExpenseService, membership: MembershipService, config: &DialogConfig) -> Self {
        let seconds = config.ttl_seconds.min(MAX_TTL_SECONDS) as i64;
        Self {
            expenses,
            membership,
            ttl: Duration::seconds(seconds),
        }
    }

    /// Whether `signal` is one of the options the dialog presents
    pub fn is_dialog_signal(signal: &str) -> bool {
        matches!(signal, SIGNAL_EDIT_AMOUNT | SIGNAL_EDIT_DESCRIPTION | SIGNAL_CANCEL)
    }

    /// Start the dialog for `expense_id` on behalf of `requester_id`.
    ///
    /// The expense and its payer are checked before the context is touched,
    /// so a refused request leaves any dialog already parked in the chat as
    /// it was. On success the new dialog supersedes it.
    pub async fn begin(
        &self,
        session: &mut ConversationContext,
        expense_id: ExpenseId,
        requester_id: UserId,
    ) -> Result<Vec<Outbound>> {
        let expense = self.expenses.get(session.chat_id, expense_id).await?;
        if expense.payer_id != requester_id {
            log_rejection(session.chat_id, Some(requester_id), "edit dialog by non-payer");
            return Err(SplitBuddyError::PermissionDenied(format!(
                "user {requester_id} cannot edit expense {expense_id}"
            )));
        }

        let currency = self.membership.group_currency(expense.group_id).await?;

        let from = session.step.map_or("idle", |step| step.as_str());
        session.set_target(expense_id, requester_id);
        session.park(DialogStep::AwaitingChoice, self.ttl);
        log_dialog_transition(session.chat_id, Some(expense_id), from, DialogStep::AwaitingChoice.as_str());

        let prompt = Reply::new("dialog.choose")
            .amount("amount", expense.amount, currency)
            .text("description", expense.description)
            .option_row(vec![
                ReplyOption::new("options.edit_amount", SIGNAL_EDIT_AMOUNT),
                ReplyOption::new("options.edit_description", SIGNAL_EDIT_DESCRIPTION),
            ])
            .option_row(vec![ReplyOption::new("options.cancel", SIGNAL_CANCEL)]);

        Ok(vec![Outbound::Send(prompt)])
    }

    /// Offer an input to the parked dialog.
    ///
    /// Returns `Ok(None)` when the dialog does not consume the input: nothing
    /// is parked, the input comes from someone other than the requester, or
    /// it is not what the current step waits for.
    pub async fn resume(
        &self,
        session: &mut ConversationContext,
        actor_id: UserId,
        input: DialogInput<'_>,
    ) -> Result<Option<Vec<Outbound>>> {
        let Some(step) = session.step else {
            return Ok(None);
        };
        if session.requester_id != Some(actor_id) {
            return Ok(None);
        }

        let outbound = match (step, input) {
            (DialogStep::AwaitingChoice, DialogInput::Signal(SIGNAL_CANCEL)) => {
                log_dialog_transition(session.chat_id, session.expense_id, step.as_str(), "cancelled");
                session.clear();
                vec![
                    Outbound::Notice(Reply::new("dialog.cancelled")),
                    Outbound::DeleteOrigin,
                ]
            }
            (DialogStep::AwaitingChoice, DialogInput::Signal(SIGNAL_EDIT_AMOUNT)) => {
                self.advance(session, step, DialogStep::AwaitingAmount);
                vec![Outbound::EditOrigin(Reply::new("dialog.amount_prompt"))]
            }
            (DialogStep::AwaitingChoice, DialogInput::Signal(SIGNAL_EDIT_DESCRIPTION)) => {
                self.advance(session, step, DialogStep::AwaitingDescription);
                vec![Outbound::EditOrigin(Reply::new("dialog.description_prompt"))]
            }
            (DialogStep::AwaitingAmount, DialogInput::Text(text)) => {
                self.finish_amount(session, actor_id, text).await?
            }
            (DialogStep::AwaitingDescription, DialogInput::Text(text)) => {
                self.finish_description(session, actor_id, text).await?
            }
            _ => return Ok(None),
        };

        Ok(Some(outbound))
    }

    fn advance(&self, session: &mut ConversationContext, from: DialogStep, to: DialogStep) {
        session.park(to, self.ttl);
        log_dialog_transition(session.chat_id, session.expense_id, from.as_str(), to.as_str());
    }

    /// One attempt only: bad input ends the dialog instead of asking again
    async fn finish_amount(
        &self,
        session: &mut ConversationContext,
        actor_id: UserId,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let expense_id = take_target(session)?;
        log_dialog_transition(session.chat_id, Some(expense_id), DialogStep::AwaitingAmount.as_str(), "idle");

        let amount = match parse_amount(text) {
            Ok(amount) => amount,
            Err(_) => {
                log_rejection(session.chat_id, Some(actor_id), "invalid amount in edit dialog");
                return Ok(vec![Outbound::send("dialog.invalid_amount")]);
            }
        };

        let updated = self
            .expenses
            .update_by_id(session.chat_id, expense_id, ExpenseChanges::amount(amount), actor_id)
            .await?;
        let currency = self.membership.group_currency(updated.group_id).await?;

        Ok(vec![Outbound::Send(
            Reply::new("dialog.amount_updated").amount("amount", updated.amount, currency),
        )])
    }

    async fn finish_description(
        &self,
        session: &mut ConversationContext,
        actor_id: UserId,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let expense_id = take_target(session)?;
        log_dialog_transition(
            session.chat_id,
            Some(expense_id),
            DialogStep::AwaitingDescription.as_str(),
            "idle",
        );

        let updated = self
            .expenses
            .update_by_id(session.chat_id, expense_id, ExpenseChanges::description(text), actor_id)
            .await?;

        Ok(vec![Outbound::Send(
            Reply::new("dialog.description_updated").text("description", updated.description),
        )])
    }
}

/// Release the context and hand back the expense it referenced
fn take_target(session: &mut ConversationContext) -> Result<i64> {
    let expense_id = session.expense_id;
    session.clear();
    expense_id.ok_or_else(|| {
        SplitBuddyError::DialogPreconditionFailed("edit dialog lost its target".to_string())
    })
}
