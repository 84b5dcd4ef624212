//! Checks that the shipped translation files cover every reply the bot sends

use std::collections::HashMap;

use serde_json::Value;
use SplitBuddy::config::I18nConfig;
use SplitBuddy::dispatch::{Reply, ParamValue};
use SplitBuddy::handlers::telegram::COMMANDS;
use SplitBuddy::i18n::{render_reply, I18n};

const REPLY_KEYS: &[&str] = &[
    "start",
    "help",
    "unknown",
    "welcome",
    "group_only",
    "add_usage",
    "delete_usage",
    "expense_added",
    "expense_updated",
    "expense_deleted",
    "transactions.header",
    "transactions.line",
    "transactions.empty",
    "balance.header",
    "balance.line",
    "balance.settled",
    "members.header",
    "members.line_active",
    "members.line_inactive",
    "currency.current",
    "currency.set",
    "currency.usage",
    "options.edit_numbered",
    "options.delete_numbered",
    "options.activate",
    "options.deactivate",
    "options.edit_amount",
    "options.edit_description",
    "options.cancel",
    "dialog.choose",
    "dialog.amount_prompt",
    "dialog.description_prompt",
    "dialog.cancelled",
    "dialog.amount_updated",
    "dialog.description_updated",
    "dialog.invalid_amount",
    "dialog.something_wrong",
    "errors.invalid_input",
    "errors.not_found",
    "errors.not_an_expense",
    "errors.not_owner",
    "errors.permission_denied",
    "errors.no_active_members",
    "errors.generic",
];

fn documents() -> HashMap<String, Value> {
    ["en", "ru"]
        .into_iter()
        .map(|lang| {
            let raw = std::fs::read_to_string(format!("translations/{lang}.json"))
                .expect("translation file should exist");
            let document = serde_json::from_str(&raw).expect("translation file should be valid JSON");
            (lang.to_string(), document)
        })
        .collect()
}

fn pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

#[test]
fn test_every_reply_key_is_translated() {
    for (lang, document) in documents() {
        for key in REPLY_KEYS {
            assert!(
                document.pointer(&pointer(key)).is_some(),
                "{lang} is missing {key}"
            );
        }
        for (_, key) in COMMANDS {
            assert!(document.pointer(&pointer(key)).is_some(), "{lang} is missing {key}");
        }
    }
}

#[tokio::test]
async fn test_shipped_translations_load_and_render() {
    let mut i18n = I18n::new(&I18nConfig::default());
    i18n.load_translations().await.expect("translations should load");

    let reply = Reply::new("expense_added")
        .amount("amount", 4000, "EUR")
        .text("description", "Beer")
        .param("count", ParamValue::Number(4));

    let english = render_reply(&i18n, &reply, "en");
    assert!(english.contains("40.00€"), "{english}");
    assert!(english.contains("Beer"), "{english}");

    let russian = render_reply(&i18n, &reply, "ru");
    assert!(russian.contains("40.00€"), "{russian}");
    assert_ne!(russian, english);
}
