//! Integration tests for recording, listing and settling expenses

use SplitBuddy::dispatch::{ChatMemberState, EventKind, ParamValue};

use crate::helpers::*;

fn amount(minor: i64, currency: &str) -> ParamValue {
    ParamValue::Amount {
        minor,
        currency: currency.to_string(),
    }
}

#[tokio::test]
async fn test_beer_round_is_settled_with_three_transfers() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB, CAROL, DAVE]).await;

    let (_, outbound) = ctx.add(ALICE, "40 Beer").await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "expense_added");
    assert_eq!(reply.params["amount"], amount(4000, "USD"));
    assert_eq!(reply.params["description"], ParamValue::Text("Beer".to_string()));
    assert_eq!(reply.params["count"], ParamValue::Number(4));

    let outbound = ctx.group(BOB, EventKind::Balance).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "balance.header");
    assert_eq!(reply.lines.len(), 3);
    for (line, debtor) in reply.lines.iter().zip(["Bob", "Carol", "Dave"]) {
        assert_eq!(line.key, "balance.line");
        assert_eq!(line.params["from"], ParamValue::Text(debtor.to_string()));
        assert_eq!(line.params["to"], ParamValue::Text("Alice".to_string()));
        assert_eq!(line.params["amount"], amount(1000, "USD"));
    }
}

#[tokio::test]
async fn test_remainder_stays_with_the_payer() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB, CAROL]).await;
    ctx.add(ALICE, "10 Pizza").await;

    let outbound = ctx.group(ALICE, EventKind::Balance).await;
    let reply = single_reply(&outbound);
    let amounts: Vec<_> = reply.lines.iter().map(|line| line.params["amount"].clone()).collect();
    assert_eq!(amounts, vec![amount(333, "USD"), amount(333, "USD")]);
}

#[tokio::test]
async fn test_opposite_debts_cancel_out() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;
    ctx.add(ALICE, "20 Taxi").await;
    ctx.add(BOB, "20 Lunch").await;

    let outbound = ctx.group(ALICE, EventKind::Balance).await;
    assert_eq!(reply_keys(&outbound), vec!["balance.settled"]);
}

#[tokio::test]
async fn test_transactions_offer_edit_and_delete_per_expense() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;

    let outbound = ctx.group(ALICE, EventKind::Transactions).await;
    assert_eq!(reply_keys(&outbound), vec!["transactions.empty"]);

    ctx.add(ALICE, "12,50 Pizza").await;
    ctx.add(BOB, "3 Coffee").await;

    let outbound = ctx.group(ALICE, EventKind::Transactions).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "transactions.header");
    assert_eq!(reply.lines.len(), 2);
    assert_eq!(reply.lines[0].params["description"], ParamValue::Text("Coffee".to_string()));
    assert_eq!(reply.lines[0].params["payer"], ParamValue::Text("Bob".to_string()));
    assert_eq!(reply.lines[1].params["amount"], amount(1250, "USD"));
    assert_eq!(reply.options.len(), 2);
    assert!(reply.options.iter().all(|row| row.len() == 2));
}

#[tokio::test]
async fn test_delete_button_is_reserved_for_the_payer() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;
    ctx.add(ALICE, "40 Beer").await;

    let listing = ctx.group(ALICE, EventKind::Transactions).await;
    let delete_signal = find_signal(single_reply(&listing), "delete_exp:").to_string();

    let outbound = ctx.click(BOB, &delete_signal).await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_owner"]);

    let outbound = ctx.click(ALICE, &delete_signal).await;
    assert_eq!(reply_keys(&outbound), vec!["expense_deleted"]);

    let outbound = ctx.click(ALICE, &delete_signal).await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_found"]);

    let outbound = ctx.group(ALICE, EventKind::Transactions).await;
    assert_eq!(reply_keys(&outbound), vec!["transactions.empty"]);
}

#[tokio::test]
async fn test_delete_command_targets_the_replied_message() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;
    let (message_id, _) = ctx.add(ALICE, "40 Beer").await;

    let outbound = ctx.group(ALICE, EventKind::Delete { replied_message_id: None }).await;
    assert_eq!(reply_keys(&outbound), vec!["delete_usage"]);

    let outbound = ctx
        .group(ALICE, EventKind::Delete { replied_message_id: Some(message_id + 50) })
        .await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_an_expense"]);

    let outbound = ctx
        .group(BOB, EventKind::Delete { replied_message_id: Some(message_id) })
        .await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_owner"]);

    let outbound = ctx
        .group(ALICE, EventKind::Delete { replied_message_id: Some(message_id) })
        .await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "expense_deleted");
    assert_eq!(reply.params["amount"], amount(4000, "USD"));
}

#[tokio::test]
async fn test_editing_the_add_message_updates_the_expense() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;
    let (message_id, _) = ctx.add(ALICE, "40 Beer").await;

    let edited = |user, text: &str| {
        group_event(
            user,
            EventKind::MessageEdited {
                message_id,
                text: text.to_string(),
            },
        )
    };

    let outbound = ctx.send(edited(ALICE, "/add 60 Beer and snacks")).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "expense_updated");
    assert_eq!(reply.params["amount"], amount(6000, "USD"));
    assert_eq!(reply.params["description"], ParamValue::Text("Beer and snacks".to_string()));

    let outbound = ctx.send(edited(BOB, "/add 1 Beer")).await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_owner"]);

    let outbound = ctx.send(edited(ALICE, "/add lots")).await;
    assert_eq!(reply_keys(&outbound), vec!["add_usage"]);

    let outbound = ctx.send(edited(ALICE, "just chatting")).await;
    assert!(outbound.is_empty());

    let outbound = ctx
        .group(
            ALICE,
            EventKind::MessageEdited {
                message_id: message_id + 1,
                text: "/add 5 Tea".to_string(),
            },
        )
        .await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_an_expense"]);

    let listing = ctx.group(ALICE, EventKind::Transactions).await;
    assert_eq!(single_reply(&listing).lines[0].params["amount"], amount(6000, "USD"));
}

#[tokio::test]
async fn test_malformed_add_gets_usage() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE]).await;

    for args in ["", "Beer", "-5 Beer", "0 Beer", "10", "1.\u{0663} Beer"] {
        let (_, outbound) = ctx.add(ALICE, args).await;
        assert_eq!(reply_keys(&outbound), vec!["add_usage"], "args: {args:?}");
    }
}

#[tokio::test]
async fn test_oversized_amounts_never_reach_the_balance() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;

    for _ in 0..2 {
        let (_, outbound) = ctx.add(ALICE, "90000000000000000 Yacht").await;
        assert_eq!(reply_keys(&outbound), vec!["add_usage"]);
    }

    let outbound = ctx.group(BOB, EventKind::Balance).await;
    assert_eq!(reply_keys(&outbound), vec!["balance.settled"]);
}

#[tokio::test]
async fn test_currency_changes_how_amounts_are_reported() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;

    let outbound = ctx.group(ALICE, EventKind::Currency { raw_args: String::new() }).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "currency.current");
    assert_eq!(reply.params["currency"], ParamValue::Text("USD".to_string()));

    let outbound = ctx.group(ALICE, EventKind::Currency { raw_args: "euro".to_string() }).await;
    assert_eq!(reply_keys(&outbound), vec!["currency.usage"]);

    let outbound = ctx.group(ALICE, EventKind::Currency { raw_args: "eur".to_string() }).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.key, "currency.set");
    assert_eq!(reply.params["currency"], ParamValue::Text("EUR".to_string()));

    let (_, outbound) = ctx.add(BOB, "8 Snacks").await;
    assert_eq!(single_reply(&outbound).params["amount"], amount(800, "EUR"));
}

#[tokio::test]
async fn test_ledger_commands_are_group_only() {
    let ctx = TestContext::new();

    let outbound = ctx
        .send(private_event(
            ALICE,
            EventKind::Add {
                raw_args: "40 Beer".to_string(),
                message_id: 1,
            },
        ))
        .await;
    assert_eq!(reply_keys(&outbound), vec!["group_only"]);

    let outbound = ctx.send(private_event(ALICE, EventKind::Balance)).await;
    assert_eq!(reply_keys(&outbound), vec!["group_only"]);

    let outbound = ctx.send(private_event(ALICE, EventKind::Start)).await;
    assert_eq!(reply_keys(&outbound), vec!["start"]);

    let outbound = ctx
        .send(private_event(ALICE, EventKind::Text { text: "hello?".to_string() }))
        .await;
    assert_eq!(reply_keys(&outbound), vec!["unknown"]);
}

#[tokio::test]
async fn test_bot_added_to_group_says_hello() {
    let ctx = TestContext::new();

    let outbound = ctx
        .group(
            ALICE,
            EventKind::MembershipChanged {
                new_status: ChatMemberState::Member,
                previous_status: ChatMemberState::Left,
            },
        )
        .await;
    assert_eq!(reply_keys(&outbound), vec!["welcome"]);

    let outbound = ctx
        .group(
            ALICE,
            EventKind::MembershipChanged {
                new_status: ChatMemberState::Kicked,
                previous_status: ChatMemberState::Member,
            },
        )
        .await;
    assert!(outbound.is_empty());
}
