//! Money parsing and formatting.
//!
//! Monetary cells arrive as doubles, integers or strings that may carry a dollar sign and
//! thousands separators. Statement output always uses two decimals with thousands separators,
//! e.g. `1,300.00`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Formats a value for the statement, with thousands separators and two decimals.
pub fn format_amount(value: Decimal) -> String {
    format_num::format_num!(",.2", value.to_f64().unwrap_or_default())
}

/// Parses a monetary string that may carry a dollar sign and commas. Returns `None` when the
/// string is empty or not a number.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let cleaned = rest.replace(',', "");
    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -value } else { value })
}
