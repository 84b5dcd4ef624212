//! Balance netting
//!
//! Turns a group's expenses into the list of transfers that settles every
//! member. Pure computation over integer minor units.
//!
//! Each expense is split in equal integer shares (`amount / participants`).
//! The division remainder is absorbed by the payer, whose credit is reduced
//! by it, so balances always sum to exactly zero and no rounding dust is left
//! for the matching step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Expense, UserId};
use crate::utils::errors::{Result, SplitBuddyError};

/// One settle-up payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: UserId,
    pub to: UserId,
    /// Minor units, always positive
    pub amount: i64,
}

/// Signed balance of one user: positive is owed money, negative owes money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalance {
    pub user_id: UserId,
    pub net: i64,
}

/// Accumulate per-user balances in the order users are first encountered
pub fn net_balances(expenses: &[Expense]) -> Result<Vec<NetBalance>> {
    let mut order: Vec<NetBalance> = Vec::new();
    let mut index: HashMap<UserId, usize> = HashMap::new();

    let mut add = |user_id: UserId, delta: i64| -> Result<()> {
        let slot = *index.entry(user_id).or_insert_with(|| {
            order.push(NetBalance { user_id, net: 0 });
            order.len() - 1
        });
        order[slot].net = order[slot].net.checked_add(delta).ok_or_else(|| overflow(user_id))?;
        Ok(())
    };

    for expense in expenses {
        let count = expense.participants.len() as i64;
        if count == 0 {
            continue;
        }

        let share = expense.amount / count;
        let remainder = expense.amount - share * count;

        add(expense.payer_id, expense.amount - remainder)?;
        for participant in &expense.participants {
            add(*participant, -share)?;
        }
    }

    Ok(order)
}

/// Compute settle-up transfers for a set of expenses.
///
/// Debtors and creditors keep encounter order and are matched head to head;
/// whichever side is fully settled advances. Running this twice on the same
/// input yields the same list.
pub fn settle(expenses: &[Expense]) -> Result<Vec<Transfer>> {
    let balances = net_balances(expenses)?;

    let mut creditors: Vec<(UserId, i64)> = Vec::new();
    let mut debtors: Vec<(UserId, i64)> = Vec::new();
    for balance in &balances {
        if balance.net > 0 {
            creditors.push((balance.user_id, balance.net));
        } else if balance.net < 0 {
            let owed = balance.net.checked_neg().ok_or_else(|| overflow(balance.user_id))?;
            debtors.push((balance.user_id, owed));
        }
    }

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let (debtor, owed) = debtors[i];
        let (creditor, credit) = creditors[j];
        let amount = owed.min(credit);

        if amount > 0 && debtor != creditor {
            transfers.push(Transfer { from: debtor, to: creditor, amount });
        }

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;

        if debtors[i].1 == 0 {
            i += 1;
        }
        if creditors[j].1 == 0 {
            j += 1;
        }
    }

    Ok(transfers)
}

fn overflow(user_id: UserId) -> SplitBuddyError {
    SplitBuddyError::Validation(format!("balance of user {user_id} is out of range"))
}
