//! Money
//!
//! Amounts are plain `i64` minor units. `rusty-money` is only used at the edges
//! to resolve currencies and to render amounts for people.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Errors raised by money arithmetic and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Checked arithmetic overflowed `i64`.
    #[error("money arithmetic overflowed")]
    Overflow,

    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The amount could not be parsed, or has more precision than the currency allows.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Resolves an ISO 4217 currency code.
///
/// # Errors
///
/// Returns [`MoneyError::UnknownCurrency`] if the code is not recognised.
pub fn currency(code: &str) -> Result<&'static iso::Currency, MoneyError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| MoneyError::UnknownCurrency(code.to_string()))
}

/// Multiplies a unit price by a quantity.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total(unit_price: i64, quantity: u32) -> Result<i64, MoneyError> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or(MoneyError::Overflow)
}

/// Sums amounts with overflow checking.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] if the sum does not fit in an `i64`.
pub fn checked_sum(amounts: impl IntoIterator<Item = i64>) -> Result<i64, MoneyError> {
    amounts
        .into_iter()
        .try_fold(0_i64, |acc, amount| acc.checked_add(amount))
        .ok_or(MoneyError::Overflow)
}

/// Parses a major-unit amount such as `"25.00"` into minor units of `currency`.
///
/// The amount must not carry more decimal places than the currency has; nothing is
/// rounded here.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidAmount`] if the text is not a decimal number, has
/// too much precision, or does not fit in an `i64`.
pub fn parse_major(s: &str, currency: &iso::Currency) -> Result<i64, MoneyError> {
    let invalid = || MoneyError::InvalidAmount(s.to_string());

    let amount = s.trim().parse::<Decimal>().map_err(|_err| invalid())?;
    let scale = Decimal::from(10_i64.checked_pow(currency.exponent).ok_or_else(invalid)?);
    let minor = amount.checked_mul(scale).ok_or_else(invalid)?;

    if minor.fract() != Decimal::ZERO {
        return Err(invalid());
    }

    minor.to_i64().ok_or_else(invalid)
}

/// Renders minor units as a human readable amount, e.g. `$25.00`.
pub fn format_minor(minor: i64, currency: &iso::Currency) -> String {
    Money::from_minor(minor, currency).to_string()
}
