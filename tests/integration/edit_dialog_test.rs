//! Integration tests for the inline edit dialog

use SplitBuddy::dispatch::{EventKind, Outbound, ParamValue, Reply};
use SplitBuddy::state::dialog::{SIGNAL_CANCEL, SIGNAL_EDIT_AMOUNT, SIGNAL_EDIT_DESCRIPTION};

use crate::helpers::*;

/// Record an expense paid by Alice and return its edit signal and id
async fn alice_expense(ctx: &mut TestContext) -> (String, i64) {
    ctx.join(&[ALICE, BOB, CAROL]).await;
    ctx.add(ALICE, "40 Beer").await;

    let listing = ctx.group(ALICE, EventKind::Transactions).await;
    let signal = find_signal(single_reply(&listing), "edit_exp:").to_string();
    let id = signal
        .split_once(':')
        .and_then(|(_, id)| id.parse().ok())
        .expect("edit signal carries the expense id");
    (signal, id)
}

#[tokio::test]
async fn test_amount_edit_flow() {
    let mut ctx = TestContext::new();
    let (edit_signal, expense_id) = alice_expense(&mut ctx).await;

    let outbound = ctx.click(ALICE, &edit_signal).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "dialog.choose");
    assert_eq!(
        reply.signals().collect::<Vec<_>>(),
        vec![SIGNAL_EDIT_AMOUNT, SIGNAL_EDIT_DESCRIPTION, SIGNAL_CANCEL]
    );
    assert_eq!(ctx.sessions.len().await, 1);

    let outbound = ctx.click(ALICE, SIGNAL_EDIT_AMOUNT).await;
    assert_eq!(
        outbound,
        vec![Outbound::EditOrigin(Reply::new("dialog.amount_prompt"))]
    );

    let outbound = ctx.say(ALICE, "12,50").await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "dialog.amount_updated");
    assert_eq!(
        reply.params["amount"],
        ParamValue::Amount { minor: 1250, currency: "USD".to_string() }
    );

    let expense = ctx.services.expense_service.get(GROUP_ID, expense_id).await.unwrap();
    assert_eq!(expense.amount, 1250);
    assert_eq!(expense.description, "Beer");
    assert!(ctx.sessions.is_empty().await);
}

#[tokio::test]
async fn test_description_edit_flow() {
    let mut ctx = TestContext::new();
    let (edit_signal, expense_id) = alice_expense(&mut ctx).await;

    ctx.click(ALICE, &edit_signal).await;
    let outbound = ctx.click(ALICE, SIGNAL_EDIT_DESCRIPTION).await;
    assert_eq!(reply_keys(&outbound), vec!["dialog.description_prompt"]);

    let outbound = ctx.say(ALICE, "Craft beer").await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "dialog.description_updated");
    assert_eq!(reply.params["description"], ParamValue::Text("Craft beer".to_string()));

    let expense = ctx.services.expense_service.get(GROUP_ID, expense_id).await.unwrap();
    assert_eq!(expense.description, "Craft beer");
    assert_eq!(expense.amount, 4000);
}

#[tokio::test]
async fn test_cancel_removes_the_prompt() {
    let mut ctx = TestContext::new();
    let (edit_signal, _) = alice_expense(&mut ctx).await;

    ctx.click(ALICE, &edit_signal).await;
    let outbound = ctx.click(ALICE, SIGNAL_CANCEL).await;
    assert_eq!(outbound.len(), 2);
    assert!(matches!(&outbound[0], Outbound::Notice(reply) if reply.key == "dialog.cancelled"));
    assert_eq!(outbound[1], Outbound::DeleteOrigin);
    assert!(ctx.sessions.is_empty().await);
}

#[tokio::test]
async fn test_only_the_payer_may_open_the_dialog() {
    let mut ctx = TestContext::new();
    let (edit_signal, _) = alice_expense(&mut ctx).await;

    let outbound = ctx.click(BOB, &edit_signal).await;
    assert_eq!(reply_keys(&outbound), vec!["errors.permission_denied"]);
    assert!(ctx.sessions.is_empty().await);
}

#[tokio::test]
async fn test_refused_edit_leaves_the_open_dialog_alone() {
    let mut ctx = TestContext::new();
    let (edit_signal, expense_id) = alice_expense(&mut ctx).await;

    ctx.click(ALICE, &edit_signal).await;
    ctx.click(ALICE, SIGNAL_EDIT_AMOUNT).await;

    let outbound = ctx.click(BOB, &edit_signal).await;
    assert_eq!(reply_keys(&outbound), vec!["errors.permission_denied"]);
    assert_eq!(ctx.sessions.len().await, 1);

    let outbound = ctx.say(ALICE, "12,50").await;
    assert_eq!(reply_keys(&outbound), vec!["dialog.amount_updated"]);

    let expense = ctx.services.expense_service.get(GROUP_ID, expense_id).await.unwrap();
    assert_eq!(expense.amount, 1250);
    assert!(ctx.sessions.is_empty().await);
}

#[tokio::test]
async fn test_other_users_do_not_drive_the_dialog() {
    let mut ctx = TestContext::new();
    let (edit_signal, expense_id) = alice_expense(&mut ctx).await;

    ctx.click(ALICE, &edit_signal).await;

    let outbound = ctx.click(BOB, SIGNAL_EDIT_AMOUNT).await;
    assert_eq!(reply_keys(&outbound), vec!["errors.permission_denied"]);

    ctx.click(ALICE, SIGNAL_EDIT_AMOUNT).await;

    // Bob's chatter passes through untouched while Alice is being asked
    let outbound = ctx.say(BOB, "99").await;
    assert!(outbound.is_empty());

    let outbound = ctx.say(ALICE, "15").await;
    assert_eq!(reply_keys(&outbound), vec!["dialog.amount_updated"]);

    let expense = ctx.services.expense_service.get(GROUP_ID, expense_id).await.unwrap();
    assert_eq!(expense.amount, 1500);
}

#[tokio::test]
async fn test_stale_dialog_option_is_reported() {
    let mut ctx = TestContext::new();
    alice_expense(&mut ctx).await;

    let outbound = ctx.click(ALICE, SIGNAL_EDIT_AMOUNT).await;
    assert_eq!(reply_keys(&outbound), vec!["dialog.something_wrong"]);
}

#[tokio::test]
async fn test_invalid_amount_ends_the_dialog_without_changes() {
    let mut ctx = TestContext::new();
    let (edit_signal, expense_id) = alice_expense(&mut ctx).await;

    ctx.click(ALICE, &edit_signal).await;
    ctx.click(ALICE, SIGNAL_EDIT_AMOUNT).await;

    let outbound = ctx.say(ALICE, "-5").await;
    assert_eq!(reply_keys(&outbound), vec!["dialog.invalid_amount"]);
    assert!(ctx.sessions.is_empty().await);

    let expense = ctx.services.expense_service.get(GROUP_ID, expense_id).await.unwrap();
    assert_eq!(expense.amount, 4000);

    // The dialog is over, so another number is ordinary chatter
    let outbound = ctx.say(ALICE, "12").await;
    assert!(outbound.is_empty());
}

#[tokio::test]
async fn test_expense_deleted_while_editing() {
    let mut ctx = TestContext::new();
    let (edit_signal, _) = alice_expense(&mut ctx).await;

    ctx.click(ALICE, &edit_signal).await;
    ctx.click(ALICE, SIGNAL_EDIT_AMOUNT).await;

    let listing = ctx.group(ALICE, EventKind::Transactions).await;
    let delete_signal = find_signal(single_reply(&listing), "delete_exp:").to_string();
    let outbound = ctx.click(ALICE, &delete_signal).await;
    assert_eq!(reply_keys(&outbound), vec!["expense_deleted"]);

    let outbound = ctx.say(ALICE, "5").await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_found"]);
    assert!(ctx.sessions.is_empty().await);
}
