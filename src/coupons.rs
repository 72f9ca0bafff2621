//! Coupons
//!
//! A coupon is checked against the cart subtotal at a given moment. Failures are classified so the
//! app can tell the customer exactly why a code was refused, and the checks always run in the same
//! order so the same inputs always produce the same message.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    discounts::{DiscountError, percent_of_minor, percent_points},
    money::{MoneyConversionError, money, to_decimal, to_minor},
};

/// Reasons a coupon code cannot be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon has this exact (case-sensitive) code.
    #[error("coupon {0:?} not found")]
    NotFound(String),

    /// The coupon's amounts are in a different currency from the subtotal.
    #[error("coupon currency {0} does not match cart currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The coupon has been switched off.
    #[error("coupon is not active")]
    Inactive,

    /// The coupon's validity window has not started yet.
    #[error("coupon is not valid before {valid_from}")]
    NotYetValid {
        /// Start of the validity window
        valid_from: Timestamp,
    },

    /// The coupon's validity window has ended.
    #[error("coupon expired at {valid_till}")]
    Expired {
        /// End of the validity window
        valid_till: Timestamp,
    },

    /// The subtotal is below the coupon's minimum order value.
    #[error("order subtotal {subtotal} is below the coupon minimum of {minimum}")]
    BelowMinimum {
        /// Required subtotal, in major units
        minimum: Decimal,
        /// Actual subtotal, in major units
        subtotal: Decimal,
    },

    /// The percentage discount could not be computed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// A discount coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    /// Storage id, sent with the order
    pub id: String,

    /// Code the customer types in
    pub code: String,

    /// Whether the coupon is switched on
    pub is_active: bool,

    /// Start of the validity window (inclusive)
    pub valid_from: Timestamp,

    /// End of the validity window (inclusive)
    pub valid_till: Timestamp,

    /// Minimum subtotal the coupon applies to
    pub min_order_value: Money<'a, Currency>,

    /// Flat amount off rather than a percentage
    pub is_flat: bool,

    /// Flat discount amount, or the cap on a percentage discount (zero means uncapped)
    pub max_amount: Money<'a, Currency>,

    /// Percentage off, used when not flat
    pub percentage: Percentage,
}

impl<'a> Coupon<'a> {
    /// Check the coupon against a subtotal at `now`, returning the discount it grants.
    ///
    /// # Errors
    ///
    /// The first failing check, in order: [`CouponError::CurrencyMismatch`],
    /// [`CouponError::Inactive`], [`CouponError::NotYetValid`], [`CouponError::Expired`],
    /// [`CouponError::BelowMinimum`]. A percentage overflow surfaces as
    /// [`CouponError::Discount`].
    pub fn check(
        &self,
        subtotal: Money<'a, Currency>,
        now: Timestamp,
    ) -> Result<Money<'a, Currency>, CouponError> {
        let currency = subtotal.currency();
        let coupon_currency = self.min_order_value.currency();

        if coupon_currency != currency || self.max_amount.currency() != currency {
            return Err(CouponError::CurrencyMismatch(
                coupon_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        if !self.is_active {
            return Err(CouponError::Inactive);
        }

        if now < self.valid_from {
            return Err(CouponError::NotYetValid {
                valid_from: self.valid_from,
            });
        }

        if now > self.valid_till {
            return Err(CouponError::Expired {
                valid_till: self.valid_till,
            });
        }

        if subtotal.to_minor_units() < self.min_order_value.to_minor_units() {
            return Err(CouponError::BelowMinimum {
                minimum: to_decimal(self.min_order_value.to_minor_units(), currency),
                subtotal: to_decimal(subtotal.to_minor_units(), currency),
            });
        }

        self.discount_for(subtotal)
    }

    /// Whether the coupon applies to `subtotal` at `now`.
    pub fn is_applicable(&self, subtotal: Money<'a, Currency>, now: Timestamp) -> bool {
        self.check(subtotal, now).is_ok()
    }

    /// The discount this coupon grants on `subtotal`, ignoring activity, window and minimum.
    ///
    /// Flat coupons grant `max_amount`. Percentage coupons grant `percentage` of the subtotal,
    /// capped at `max_amount` when it is above zero.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Discount`] if the percentage calculation overflows.
    pub fn discount_for(
        &self,
        subtotal: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, CouponError> {
        if self.is_flat {
            return Ok(self.max_amount);
        }

        let percent_off = percent_of_minor(&self.percentage, subtotal.to_minor_units())?;
        let cap = self.max_amount.to_minor_units();

        let discount = if cap > 0 {
            percent_off.min(cap)
        } else {
            percent_off
        };

        Ok(money(discount, subtotal.currency()))
    }
}

/// A coupon that passed validation, with the discount it grants.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon<'a> {
    /// Coupon storage id
    pub coupon_id: String,

    /// Code the customer entered
    pub code: String,

    /// Discount granted on the validated subtotal
    pub discount: Money<'a, Currency>,
}

/// Find `code` among `coupons` and validate it against `subtotal` at `now`.
///
/// Pure: the same inputs always give the same result.
///
/// # Errors
///
/// [`CouponError::NotFound`] when no coupon has exactly this code, otherwise whatever
/// [`Coupon::check`] reports.
pub fn validate<'a>(
    coupons: &[Coupon<'a>],
    code: &str,
    subtotal: Money<'a, Currency>,
    now: Timestamp,
) -> Result<AppliedCoupon<'a>, CouponError> {
    let outcome = coupons
        .iter()
        .find(|coupon| coupon.code == code)
        .ok_or_else(|| CouponError::NotFound(code.to_string()))
        .and_then(|coupon| {
            let discount = coupon.check(subtotal, now)?;

            Ok(AppliedCoupon {
                coupon_id: coupon.id.clone(),
                code: coupon.code.clone(),
                discount,
            })
        });

    match &outcome {
        Ok(applied) => debug!(code, discount = %applied.discount, "coupon accepted"),
        Err(error) => debug!(code, %error, "coupon rejected"),
    }

    outcome
}

/// A coupon as served by the `/coupons` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRecord {
    /// Storage id
    #[serde(rename = "_id")]
    pub id: String,

    /// Code
    pub code: String,

    /// Whether the coupon is switched on
    pub is_active: bool,

    /// Start of the validity window
    pub valid_from: Timestamp,

    /// End of the validity window
    pub valid_till: Timestamp,

    /// Minimum subtotal in major units
    #[serde(default)]
    pub min_order_value: Decimal,

    /// Flat amount off rather than a percentage
    pub is_flat: bool,

    /// Flat amount or percentage cap, in major units
    #[serde(default)]
    pub max_amount: Decimal,

    /// Whole-number percentage, e.g. `10` for 10% off
    #[serde(default)]
    pub percentage: Decimal,
}

impl CouponRecord {
    /// Convert into a [`Coupon`] with amounts in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyConversionError`] if an amount does not fit in minor units.
    pub fn into_coupon(self, currency: &Currency) -> Result<Coupon<'_>, MoneyConversionError> {
        Ok(Coupon {
            min_order_value: money(to_minor(self.min_order_value, currency)?, currency),
            max_amount: money(to_minor(self.max_amount, currency)?, currency),
            percentage: percent_points(self.percentage),
            id: self.id,
            code: self.code,
            is_active: self.is_active,
            valid_from: self.valid_from,
            valid_till: self.valid_till,
            is_flat: self.is_flat,
        })
    }
}
