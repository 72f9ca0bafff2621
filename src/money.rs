//! Money
//!
//! Wire data carries amounts as decimals in major units ("12.50"); the pricing core works in
//! `i64` minor units of the cart currency and only wraps them in [`Money`] at the edges.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors converting between decimal amounts and minor units.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyConversionError {
    /// The amount does not fit in `i64` minor units of the currency.
    #[error("amount {0} cannot be represented in minor units of {1}")]
    OutOfRange(Decimal, &'static str),

    /// Unknown or unsupported currency code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Convert a major-unit decimal amount into minor units of `currency`.
///
/// Sub-minor fractions are rounded half away from zero.
///
/// # Errors
///
/// Returns [`MoneyConversionError::OutOfRange`] if the scaled amount overflows `i64`.
pub fn to_minor(amount: Decimal, currency: &Currency) -> Result<i64, MoneyConversionError> {
    10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .and_then(|scale| amount.checked_mul(scale))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or(MoneyConversionError::OutOfRange(
            amount,
            currency.iso_alpha_code,
        ))
}

/// Convert minor units of `currency` back into a major-unit decimal.
pub fn to_decimal(minor: i64, currency: &Currency) -> Decimal {
    // ISO 4217 exponents are at most 4, well inside `Decimal`'s scale limit of 28.
    Decimal::new(minor, currency.exponent)
}

/// Wrap minor units as [`Money`].
pub fn money(minor: i64, currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(minor, currency)
}

/// Look up a supported currency by its ISO alpha code.
///
/// # Errors
///
/// Returns [`MoneyConversionError::UnknownCurrency`] for codes outside the supported set.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, MoneyConversionError> {
    match code.trim() {
        "BDT" => Ok(iso::BDT),
        "INR" => Ok(iso::INR),
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        other => Err(MoneyConversionError::UnknownCurrency(other.to_string())),
    }
}
