//! pt-BR presentation helpers for money and dates.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

const CURRENCY_SYMBOL: &str = "R$";

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
///
/// Rounds half away from zero to cents.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (integer, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "{sign}{CURRENCY_SYMBOL} {},{cents}",
        group_thousands(integer)
    )
}

/// Formats a date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn group_thousands(integer: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
