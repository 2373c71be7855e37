//! Formatting and timestamp helpers

use chrono::{DateTime, NaiveDateTime, Utc};
use fraudlens_config::{CurrencyConfig, SymbolPosition};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Accepted layouts for timestamps that carry no offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    match s.strip_prefix('-') {
        Some(digits) => format!("-{}", group_thousands(digits, ",")),
        None => group_thousands(&s, ","),
    }
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format an amount as currency, e.g. `₹1,234.50`
///
/// Rounds half away from zero to the configured number of decimal places.
/// Non-finite amounts are rendered verbatim.
pub fn format_currency(amount: f64, currency: &CurrencyConfig) -> String {
    let value = match Decimal::from_str(&amount.to_string()) {
        Ok(v) => v,
        Err(_) => return amount.to_string(),
    };
    let rounded = value.round_dp_with_strategy(
        currency.decimal_places,
        RoundingStrategy::MidpointAwayFromZero,
    );

    let plain = format!("{:.*}", currency.decimal_places as usize, rounded.abs());
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut body = group_thousands(int_part, &currency.thousands_separator);
    if let Some(frac) = frac_part {
        body.push_str(&currency.decimal_separator);
        body.push_str(frac);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{}{}", sign, currency.symbol, body),
        SymbolPosition::After => format!("{}{} {}", sign, body, currency.symbol),
    }
}

/// Parse a timestamp without offset information
pub fn parse_naive_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse an ISO-8601 instant. Offset-less input is read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_naive_datetime(raw).map(|naive| naive.and_utc())
}

/// Display form of a record timestamp (`YYYY-MM-DD HH:MM`, UTC)
pub fn format_timestamp(raw: &str) -> String {
    match parse_instant(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}

/// Sanitize free text before it is embedded in an HTML fragment
pub fn escape_html(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
