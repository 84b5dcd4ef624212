//! Integration tests for the members list and participation toggles

use SplitBuddy::dispatch::{EventKind, Outbound, ParamValue, Reply};

use crate::helpers::*;

fn members_reply(outbound: &[Outbound]) -> &Reply {
    let reply = single_reply(outbound);
    assert_eq!(reply.key, "members.header");
    reply
}

fn line_keys(reply: &Reply) -> Vec<(String, ParamValue)> {
    reply
        .lines
        .iter()
        .map(|line| (line.key.clone(), line.params["name"].clone()))
        .collect()
}

fn name(user: i64) -> ParamValue {
    ParamValue::Text(user_name(user).to_string())
}

#[tokio::test]
async fn test_members_are_listed_in_join_order() {
    let ctx = TestContext::new();
    ctx.join(&[ALICE, BOB, CAROL]).await;

    let outbound = ctx.group(BOB, EventKind::Members).await;
    let reply = members_reply(&outbound);
    assert_eq!(
        line_keys(reply),
        vec![
            ("members.line_active".to_string(), name(ALICE)),
            ("members.line_active".to_string(), name(BOB)),
            ("members.line_active".to_string(), name(CAROL)),
        ]
    );
    assert_eq!(
        reply.signals().collect::<Vec<_>>(),
        vec!["deactivate_member:1001", "deactivate_member:1002", "deactivate_member:1003"]
    );
}

#[tokio::test]
async fn test_inactive_members_skip_new_expenses() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB, CAROL]).await;

    let outbound = ctx.click(BOB, &format!("deactivate_member:{CAROL}")).await;
    assert_eq!(outbound.len(), 1);
    let Outbound::EditOrigin(reply) = &outbound[0] else {
        panic!("members list should be refreshed in place: {outbound:?}");
    };
    assert_eq!(reply.lines[2].key, "members.line_inactive");
    assert!(reply.signals().any(|signal| signal == format!("activate_member:{CAROL}")));

    let (_, outbound) = ctx.add(ALICE, "30 Dinner").await;
    assert_eq!(single_reply(&outbound).params["count"], ParamValue::Number(2));

    let outbound = ctx.group(ALICE, EventKind::Balance).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.lines.len(), 1);
    assert_eq!(reply.lines[0].params["from"], name(BOB));
    assert_eq!(
        reply.lines[0].params["amount"],
        ParamValue::Amount { minor: 1500, currency: "USD".to_string() }
    );
}

#[tokio::test]
async fn test_deactivation_does_not_rewrite_history() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;
    ctx.add(ALICE, "20 Lunch").await;

    ctx.click(ALICE, &format!("deactivate_member:{BOB}")).await;

    let outbound = ctx.group(ALICE, EventKind::Balance).await;
    let reply = single_reply(&outbound);
    assert_eq!(reply.lines.len(), 1);
    assert_eq!(reply.lines[0].params["from"], name(BOB));
}

#[tokio::test]
async fn test_reactivated_member_shares_again() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;

    ctx.click(ALICE, &format!("deactivate_member:{BOB}")).await;
    let outbound = ctx.click(ALICE, &format!("activate_member:{BOB}")).await;
    let Outbound::EditOrigin(reply) = &outbound[0] else {
        panic!("members list should be refreshed in place: {outbound:?}");
    };
    assert_eq!(reply.lines[1].key, "members.line_active");

    let (_, outbound) = ctx.add(ALICE, "10 Tea").await;
    assert_eq!(single_reply(&outbound).params["count"], ParamValue::Number(2));
}

#[tokio::test]
async fn test_expense_needs_an_active_member() {
    let mut ctx = TestContext::new();
    ctx.join(&[ALICE]).await;

    ctx.click(ALICE, &format!("deactivate_member:{ALICE}")).await;
    let (_, outbound) = ctx.add(ALICE, "10 Tea").await;
    assert_eq!(reply_keys(&outbound), vec!["errors.no_active_members"]);

    let outbound = ctx.group(ALICE, EventKind::Transactions).await;
    assert_eq!(reply_keys(&outbound), vec!["transactions.empty"]);
}

#[tokio::test]
async fn test_toggling_a_stranger_is_not_found() {
    let ctx = TestContext::new();
    ctx.join(&[ALICE]).await;

    let outbound = ctx.click(ALICE, "deactivate_member:424242").await;
    assert_eq!(reply_keys(&outbound), vec!["errors.not_found"]);
}

#[tokio::test]
async fn test_newcomer_joins_active_and_keeps_status() {
    let ctx = TestContext::new();
    ctx.join(&[ALICE, BOB]).await;
    ctx.click(ALICE, &format!("deactivate_member:{BOB}")).await;

    // Speaking again must not flip the membership back
    ctx.join(&[BOB, DAVE]).await;

    let outbound = ctx.group(ALICE, EventKind::Members).await;
    let reply = members_reply(&outbound);
    assert_eq!(
        line_keys(reply),
        vec![
            ("members.line_active".to_string(), name(ALICE)),
            ("members.line_inactive".to_string(), name(BOB)),
            ("members.line_active".to_string(), name(DAVE)),
        ]
    );
}
