//! Checkout
//!
//! Turns a cart, an optional coupon and the customer's delivery choices into the payload the
//! order API expects. Assembly is a stateless transform: either every input is present and a
//! payload comes back, or the first missing input is named.

use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    addresses::{Address, AddressField},
    cart::Cart,
    coupons::AppliedCoupon,
    items::{LineItem, LineItemKey},
    money::to_decimal,
};

/// Reasons an order payload cannot be assembled.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// No delivery slot was chosen.
    #[error("please select a delivery slot")]
    MissingDeliverySlot,

    /// No delivery address was chosen.
    #[error("please select a delivery address")]
    MissingAddress,

    /// The chosen address is missing a required field.
    #[error("delivery address is missing its {0}")]
    IncompleteAddress(AddressField),

    /// No payment method was chosen.
    #[error("please select a payment method")]
    MissingPaymentMethod,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[serde(rename = "cod")]
    CashOnDelivery,

    /// Card payment
    Card,

    /// Mobile wallet (bKash, Nagad, ...)
    MobileWallet,
}

impl PaymentMethod {
    /// Wire name of the payment method.
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileWallet => "mobile_wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised payment method name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::CashOnDelivery),
            "card" => Ok(PaymentMethod::Card),
            "mobile_wallet" => Ok(PaymentMethod::MobileWallet),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// A delivery day and time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySlot {
    /// Delivery day
    pub date: Date,

    /// Time window label, e.g. `"10:00-12:00"`
    pub window: String,
}

/// Order lifecycle status as sent on creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting confirmation
    #[default]
    Pending,
}

/// Where the order was placed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderOrigin {
    /// The mobile app
    #[default]
    App,
}

/// One cart line in the order payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product id
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Quantity
    pub qty: u32,

    /// Unit price
    pub unit_price: Decimal,

    /// `unit_price × qty`
    pub total_price: Decimal,

    /// Image reference
    pub image: Option<String>,

    /// Line key
    pub unique_id: LineItemKey,

    /// Per-unit VAT
    pub unit_vat: Decimal,

    /// Customer note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Variant display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
}

impl OrderLine {
    fn from_line(line: &LineItem, currency: &Currency) -> Self {
        Self {
            id: line.product_id().to_string(),
            name: line.name().to_string(),
            qty: line.qty(),
            unit_price: to_decimal(line.unit_price(), currency),
            total_price: to_decimal(line.line_total(), currency),
            image: line.image().map(str::to_string),
            unique_id: line.unique_id().clone(),
            unit_vat: to_decimal(line.vat(), currency),
            note: line.note().map(str::to_string),
            variant_name: line.variant_name().map(str::to_string),
        }
    }
}

/// Cart section of the order payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCart {
    /// Order lines
    pub items: Vec<OrderLine>,

    /// Amount payable after all discounts
    pub total: Decimal,

    /// Σ `unit_price × qty`
    pub sub_total: Decimal,

    /// Σ `vat × qty`
    pub vat: Decimal,

    /// Delivery charge
    pub shipping: Decimal,

    /// Line discounts plus the coupon discount
    pub discount: Decimal,

    /// Applied coupon, if any
    pub coupon_id: Option<String>,

    /// Amount still to be collected
    pub due_amount: Decimal,
}

/// The body of an order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Lines and totals
    pub cart: OrderCart,

    /// Delivery address
    pub address: Address,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Amount to be paid
    pub payment_amount: Decimal,

    /// Chosen delivery slot
    pub delivery_slot: DeliverySlot,

    /// Initial status
    pub status: OrderStatus,

    /// Order origin
    pub origin: OrderOrigin,

    /// When the order was placed
    pub order_date: Timestamp,
}

/// Assemble the order payload.
///
/// `final_total = max(0, cart total − coupon discount)` and
/// `final_discount = cart discount + coupon discount`.
///
/// # Errors
///
/// The first failing check, in order: [`ValidationError::EmptyCart`],
/// [`ValidationError::MissingDeliverySlot`], [`ValidationError::MissingAddress`],
/// [`ValidationError::IncompleteAddress`],
/// [`ValidationError::MissingPaymentMethod`].
pub fn build_order_payload(
    cart: &Cart<'_>,
    coupon: Option<&AppliedCoupon<'_>>,
    address: Option<&Address>,
    payment_method: Option<PaymentMethod>,
    delivery_slot: Option<&DeliverySlot>,
    order_date: Timestamp,
) -> Result<OrderPayload, ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    let delivery_slot = delivery_slot.ok_or(ValidationError::MissingDeliverySlot)?;

    let address = address.ok_or(ValidationError::MissingAddress)?;
    if let Some(field) = address.first_missing() {
        return Err(ValidationError::IncompleteAddress(field));
    }

    let payment_method = payment_method.ok_or(ValidationError::MissingPaymentMethod)?;

    let currency = cart.currency();
    let totals = cart.totals();
    let coupon_discount = coupon.map_or(0, |applied| applied.discount.to_minor_units());

    let final_total = totals
        .total
        .to_minor_units()
        .saturating_sub(coupon_discount)
        .max(0);
    let line_discount = totals.discount.to_minor_units();
    let final_discount = line_discount
        .checked_add(coupon_discount)
        .unwrap_or_else(|| {
            warn!(line_discount, coupon_discount, "final discount saturated");
            line_discount.saturating_add(coupon_discount)
        });

    debug!(
        lines = cart.len(),
        final_total,
        final_discount,
        coupon = ?coupon.map(|applied| applied.code.as_str()),
        %payment_method,
        "assembled order payload"
    );

    let final_total = to_decimal(final_total, currency);

    Ok(OrderPayload {
        cart: OrderCart {
            items: cart
                .items()
                .iter()
                .map(|line| OrderLine::from_line(line, currency))
                .collect(),
            total: final_total,
            sub_total: to_decimal(totals.sub_total.to_minor_units(), currency),
            vat: to_decimal(totals.vat.to_minor_units(), currency),
            shipping: to_decimal(totals.shipping.to_minor_units(), currency),
            discount: to_decimal(final_discount, currency),
            coupon_id: coupon.map(|applied| applied.coupon_id.clone()),
            due_amount: final_total,
        },
        address: address.clone(),
        payment_method,
        payment_amount: final_total,
        delivery_slot: delivery_slot.clone(),
        status: OrderStatus::Pending,
        origin: OrderOrigin::App,
        order_date,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BDT};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{items::NewItem, shipping::ShippingPolicy};

    use super::*;

    fn cart() -> Cart<'static> {
        let mut cart = Cart::new(BDT, ShippingPolicy::flat(6_000));

        cart.add_item(NewItem::new("p1", "Rice", 10_000).with_vat(500), 2);
        cart.add_item(
            NewItem::new("p2", "Hilsa", 80_000)
                .with_variant("cut", "Cut & cleaned", None)
                .with_note("no head"),
            1,
        );

        cart
    }

    fn address() -> Address {
        Address {
            name: "Rahim Uddin".to_string(),
            phone: "01700000000".to_string(),
            street: "House 12, Road 5".to_string(),
            area: "Dhanmondi".to_string(),
            city: "Dhaka".to_string(),
            postal_code: None,
        }
    }

    fn slot() -> DeliverySlot {
        DeliverySlot {
            date: jiff::civil::date(2026, 6, 16),
            window: "10:00-12:00".to_string(),
        }
    }

    fn now() -> Result<Timestamp, jiff::Error> {
        "2026-06-15T12:00:00Z".parse()
    }

    #[test]
    fn builds_payload_without_coupon() -> TestResult {
        let payload = build_order_payload(
            &cart(),
            None,
            Some(&address()),
            Some(PaymentMethod::CashOnDelivery),
            Some(&slot()),
            now()?,
        )?;

        assert_eq!(payload.cart.items.len(), 2);
        assert_eq!(payload.cart.sub_total, Decimal::from(1_000));
        assert_eq!(payload.cart.vat, Decimal::from(10));
        assert_eq!(payload.cart.shipping, Decimal::from(60));
        assert_eq!(payload.cart.total, Decimal::from(1_070));
        assert_eq!(payload.cart.discount, Decimal::ZERO);
        assert_eq!(payload.cart.coupon_id, None);
        assert_eq!(payload.payment_amount, Decimal::from(1_070));
        assert_eq!(payload.status, OrderStatus::Pending);

        Ok(())
    }

    #[test]
    fn coupon_reduces_total_and_adds_to_discount() -> TestResult {
        let applied = AppliedCoupon {
            coupon_id: "c1".to_string(),
            code: "SAVE50".to_string(),
            discount: Money::from_minor(5_000, BDT),
        };

        let payload = build_order_payload(
            &cart(),
            Some(&applied),
            Some(&address()),
            Some(PaymentMethod::Card),
            Some(&slot()),
            now()?,
        )?;

        assert_eq!(payload.cart.total, Decimal::from(1_020));
        assert_eq!(payload.cart.discount, Decimal::from(50));
        assert_eq!(payload.cart.due_amount, Decimal::from(1_020));
        assert_eq!(payload.cart.coupon_id.as_deref(), Some("c1"));

        Ok(())
    }

    #[test]
    fn coupon_larger_than_total_floors_at_zero() -> TestResult {
        let applied = AppliedCoupon {
            coupon_id: "c1".to_string(),
            code: "HUGE".to_string(),
            discount: Money::from_minor(10_000_000, BDT),
        };

        let payload = build_order_payload(
            &cart(),
            Some(&applied),
            Some(&address()),
            Some(PaymentMethod::Card),
            Some(&slot()),
            now()?,
        )?;

        assert_eq!(payload.cart.total, Decimal::ZERO);
        assert_eq!(payload.payment_amount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn missing_slot_is_reported_before_address_and_payment() {
        let result = build_order_payload(&cart(), None, None, None, None, Timestamp::UNIX_EPOCH);

        assert_eq!(result, Err(ValidationError::MissingDeliverySlot));
    }

    #[test]
    fn missing_slot_named_even_when_everything_else_is_present() {
        let result = build_order_payload(
            &cart(),
            None,
            Some(&address()),
            Some(PaymentMethod::CashOnDelivery),
            None,
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(ValidationError::MissingDeliverySlot));
        assert_eq!(
            ValidationError::MissingDeliverySlot.to_string(),
            "please select a delivery slot"
        );
    }

    #[test]
    fn incomplete_address_names_the_field() {
        let incomplete = Address {
            area: String::new(),
            ..address()
        };

        let result = build_order_payload(
            &cart(),
            None,
            Some(&incomplete),
            None,
            Some(&slot()),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(ValidationError::IncompleteAddress(AddressField::Area)));
    }

    #[test]
    fn missing_address_comes_after_slot() {
        let result = build_order_payload(
            &cart(),
            None,
            None,
            Some(PaymentMethod::Card),
            Some(&slot()),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(ValidationError::MissingAddress));
    }

    #[test]
    fn missing_payment_method_is_last() {
        let result = build_order_payload(
            &cart(),
            None,
            Some(&address()),
            None,
            Some(&slot()),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(ValidationError::MissingPaymentMethod));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let empty = Cart::new(BDT, ShippingPolicy::free());

        let result = build_order_payload(
            &empty,
            None,
            Some(&address()),
            Some(PaymentMethod::Card),
            Some(&slot()),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(ValidationError::EmptyCart));
    }

    #[test]
    fn payload_serializes_to_order_api_shape() -> TestResult {
        let payload = build_order_payload(
            &cart(),
            None,
            Some(&address()),
            Some(PaymentMethod::CashOnDelivery),
            Some(&slot()),
            now()?,
        )?;

        let value = serde_json::to_value(&payload)?;

        assert_eq!(value["status"], json!("pending"));
        assert_eq!(value["origin"], json!("app"));
        assert_eq!(value["paymentMethod"], json!("cod"));
        assert_eq!(value["orderDate"], json!("2026-06-15T12:00:00Z"));
        assert_eq!(value["deliverySlot"]["date"], json!("2026-06-16"));
        assert_eq!(value["cart"]["couponId"], json!(null));
        assert_eq!(value["cart"]["items"][0]["_id"], json!("p1"));
        assert_eq!(value["cart"]["items"][0]["totalPrice"], json!(200.0));
        assert_eq!(value["cart"]["items"][0]["unitVat"], json!(5.0));
        assert!(value["cart"]["items"][0].get("note").is_none());
        assert_eq!(value["cart"]["items"][1]["note"], json!("no head"));
        assert_eq!(value["cart"]["items"][1]["variantName"], json!("Cut & cleaned"));

        Ok(())
    }

    #[test]
    fn payment_method_parses_wire_names() -> TestResult {
        assert_eq!("cod".parse::<PaymentMethod>()?, PaymentMethod::CashOnDelivery);
        assert_eq!(
            "mobile_wallet".parse::<PaymentMethod>()?,
            PaymentMethod::MobileWallet
        );
        assert!("cheque".parse::<PaymentMethod>().is_err());

        Ok(())
    }
}
