//! Reply rendering
//!
//! Turns structured replies into text in the reader's language. This is the
//! only place where amounts get currency symbols and timestamps get a format.

use super::loader::{I18n, TranslationParams};
use crate::dispatch::reply::{Line, ParamValue, Params, Reply, ReplyOption};
use crate::utils::helpers::{format_amount, format_timestamp};

/// Parameter consulted for plural forms
const COUNT_PARAM: &str = "count";

fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Text(text) => text.clone(),
        ParamValue::Amount { minor, currency } => format_amount(*minor, currency),
        ParamValue::Timestamp(timestamp) => format_timestamp(*timestamp),
        ParamValue::Number(number) => number.to_string(),
    }
}

fn render_params(params: &Params) -> TranslationParams {
    params
        .iter()
        .map(|(name, value)| (name.clone(), render_value(value)))
        .collect()
}

fn translate(i18n: &I18n, key: &str, params: &Params, lang: &str) -> String {
    let rendered = render_params(params);
    match params.get(COUNT_PARAM) {
        Some(ParamValue::Number(count)) => i18n.tp(key, lang, *count, Some(&rendered)),
        _ => i18n.t(key, lang, Some(&rendered)),
    }
}

pub fn render_line(i18n: &I18n, line: &Line, lang: &str) -> String {
    translate(i18n, &line.key, &line.params, lang)
}

/// Header followed by one text line per attached line
pub fn render_reply(i18n: &I18n, reply: &Reply, lang: &str) -> String {
    std::iter::once(translate(i18n, &reply.key, &reply.params, lang))
        .chain(reply.lines.iter().map(|line| render_line(i18n, line, lang)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_option_label(i18n: &I18n, option: &ReplyOption, lang: &str) -> String {
    translate(i18n, &option.label_key, &option.label_params, lang)
}
