//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application:
//! amount parsing, command argument parsing and presentation helpers.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::utils::errors::{Result, SplitBuddyError};

/// Number of minor units in one major unit
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Largest amount a single expense may carry, in minor units
pub const MAX_AMOUNT: i64 = 1_000_000_000 * MINOR_UNITS_PER_MAJOR;

fn amount_regex() -> &'static Regex {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    AMOUNT.get_or_init(|| Regex::new(r"^([0-9]+)(?:[.,]([0-9]+))?$").expect("valid amount regex"))
}

fn add_args_regex() -> &'static Regex {
    static ADD_ARGS: OnceLock<Regex> = OnceLock::new();
    ADD_ARGS.get_or_init(|| Regex::new(r"^\s*(\S+)\s+(.*\S)\s*$").expect("valid add regex"))
}

/// Parse a decimal amount typed by a user into minor units.
///
/// Accepts comma or dot as the decimal separator and rounds half up to the
/// nearest minor unit. Zero, negative and non-numeric input is rejected.
pub fn parse_amount(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    let captures = amount_regex()
        .captures(trimmed)
        .ok_or_else(|| SplitBuddyError::Validation(format!("not an amount: {trimmed}")))?;

    let overflow = || SplitBuddyError::Validation(format!("amount too large: {trimmed}"));

    let major: i64 = captures[1].parse().map_err(|_| overflow())?;
    let fraction = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().map_or(false, |d| d >= 5);

    let minor = major
        .checked_mul(MINOR_UNITS_PER_MAJOR)
        .and_then(|v| v.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        .ok_or_else(overflow)?;

    if minor <= 0 {
        return Err(SplitBuddyError::Validation(format!(
            "amount must be positive: {trimmed}"
        )));
    }
    if minor > MAX_AMOUNT {
        return Err(overflow());
    }

    Ok(minor)
}

/// Parse `/add` arguments of the form `<amount> <description...>`.
pub fn parse_add_args(raw_args: &str) -> Result<(i64, String)> {
    let captures = add_args_regex().captures(raw_args).ok_or_else(|| {
        SplitBuddyError::Validation("expected `<amount> <description>`".to_string())
    })?;

    let amount = parse_amount(&captures[1])?;
    let description = captures[2].to_string();
    Ok((amount, description))
}

/// Split a `/command@bot args` text into its command name and argument string.
pub fn split_command(text: &str) -> Option<(String, String)> {
    let text = text.trim_start();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or(head).to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some((name, args.to_string()))
}

/// Validate an ISO-4217 style currency code (three ASCII letters)
pub fn is_valid_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Look up the display symbol of a currency, falling back to the code itself
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "RUB" => "₽",
        other => other,
    }
}

/// Format minor units for display, e.g. `1250, "EUR"` -> `12.50€`
pub fn format_amount(minor: i64, currency: &str) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let per_major = MINOR_UNITS_PER_MAJOR as u64;
    format!(
        "{}{}.{:02}{}",
        sign,
        abs / per_major,
        abs % per_major,
        currency_symbol(currency)
    )
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
