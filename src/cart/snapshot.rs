//! Cart snapshots
//!
//! The plain, JSON-friendly state shape the app persists between sessions.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    cart::Cart,
    items::{LineItem, LineItemKey, NewItem},
    money::{MoneyConversionError, to_decimal, to_minor},
    shipping::ShippingPolicy,
};

/// One persisted cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    /// Product id
    pub id: String,

    /// Line key at the time of saving; derived again on restore since note digests depend on the
    /// platform's pointer width
    pub unique_id: LineItemKey,

    /// Display name
    pub name: String,

    /// Unit price in major units
    pub price: Decimal,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Per-unit VAT
    #[serde(default)]
    pub vat: Decimal,

    /// Per-unit line discount
    #[serde(default)]
    pub discount: Decimal,

    /// Quantity
    pub qty: u32,

    /// Chosen variant
    #[serde(default)]
    pub variant_id: Option<String>,

    /// Chosen variant's display name
    #[serde(default)]
    pub variant_name: Option<String>,

    /// Remaining stock for the variant
    #[serde(default)]
    pub variant_stock: Option<u32>,

    /// Customer note
    #[serde(default)]
    pub note: Option<String>,
}

impl LineItemRecord {
    fn from_line(line: &LineItem, currency: &Currency) -> Self {
        Self {
            id: line.product_id().to_string(),
            unique_id: line.unique_id().clone(),
            name: line.name().to_string(),
            price: to_decimal(line.unit_price(), currency),
            image: line.image().map(str::to_string),
            vat: to_decimal(line.vat(), currency),
            discount: to_decimal(line.discount(), currency),
            qty: line.qty(),
            variant_id: line.variant_id().map(str::to_string),
            variant_name: line.variant_name().map(str::to_string),
            variant_stock: line.variant_stock(),
            note: line.note().map(str::to_string),
        }
    }

    fn to_new_item(&self, currency: &Currency) -> Result<NewItem, MoneyConversionError> {
        Ok(NewItem {
            product_id: self.id.clone(),
            name: self.name.clone(),
            unit_price: to_minor(self.price, currency)?,
            vat: to_minor(self.vat, currency)?,
            discount: to_minor(self.discount, currency)?,
            image: self.image.clone(),
            variant_id: self.variant_id.clone(),
            variant_name: self.variant_name.clone(),
            variant_stock: self.variant_stock,
            note: self.note.clone(),
        })
    }
}

/// Persisted cart state: the items plus the totals as they were displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Cart lines
    pub cart_items: Vec<LineItemRecord>,

    /// Subtotal
    pub sub_total: Decimal,

    /// Grand total
    pub total: Decimal,

    /// VAT
    pub vat: Decimal,

    /// Shipping
    pub shipping: Decimal,

    /// Line discounts
    pub discount: Decimal,
}

impl<'a> Cart<'a> {
    /// Capture the cart as a serializable snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        let currency = self.currency();
        let totals = self.totals();

        CartSnapshot {
            cart_items: self
                .items()
                .iter()
                .map(|line| LineItemRecord::from_line(line, currency))
                .collect(),
            sub_total: to_decimal(totals.sub_total.to_minor_units(), currency),
            total: to_decimal(totals.total.to_minor_units(), currency),
            vat: to_decimal(totals.vat.to_minor_units(), currency),
            shipping: to_decimal(totals.shipping.to_minor_units(), currency),
            discount: to_decimal(totals.discount.to_minor_units(), currency),
        }
    }

    /// Rebuild a cart from a snapshot.
    ///
    /// Line keys are derived again and the totals recomputed from the lines; the stored totals are
    /// informational only. Lines sharing a key are merged.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyConversionError`] if a stored amount does not fit in minor units.
    pub fn restore(
        snapshot: &CartSnapshot,
        currency: &'a Currency,
        shipping: ShippingPolicy,
    ) -> Result<Self, MoneyConversionError> {
        let mut cart = Cart::new(currency, shipping);

        for record in &snapshot.cart_items {
            cart.add_item(record.to_new_item(currency)?, record.qty);
        }

        Ok(cart)
    }
}
