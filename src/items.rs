//! Items
//!
//! A [`LineItem`] is one product (or product variant) sitting in the cart. Two line items are the
//! same entry when their [`LineItemKey`] matches, which is derived from the product id, the chosen
//! variant and the customer's note.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use rust_decimal::Decimal;
use rustc_hash::FxHasher;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::money::{MoneyConversionError, to_minor};

/// Errors turning a product record into a cart item.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    /// Neither `id` nor `_id` was present on the record.
    #[error("product record has no id")]
    MissingId,

    /// One of the record's amounts could not be converted to minor units.
    #[error(transparent)]
    Amount(#[from] MoneyConversionError),
}

/// Uniqueness key of a line item within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemKey(String);

impl LineItemKey {
    /// Derive the key for a product, optional variant and optional note.
    ///
    /// The key has the shape `product`, `product::variant`, `product::variant::<note digest>` or
    /// `product::<note digest>`. Blank notes and variants are ignored. `%` and `:` inside the
    /// product and variant ids are percent-escaped, so `::` only ever separates parts.
    ///
    /// The note digest is an `FxHasher` value and only stable on one pointer width; snapshots
    /// derive keys again on restore rather than trusting stored ones.
    pub fn derive(product_id: &str, variant_id: Option<&str>, note: Option<&str>) -> Self {
        let mut key = escape_part(product_id);

        if let Some(variant) = variant_id.map(str::trim).filter(|v| !v.is_empty()) {
            key.push_str("::");
            key.push_str(&escape_part(variant));
        }

        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            key.push_str("::");
            key.push_str(&note_digest(note));
        }

        Self(key)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineItemKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn escape_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());

    for ch in part.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// `FxHasher` state is `usize`-wide, so the digest is stable for a given target only.
fn note_digest(note: &str) -> String {
    let mut hasher = FxHasher::default();
    note.hash(&mut hasher);

    format!("{:016x}", hasher.finish())
}

/// A product about to be placed in the cart.
///
/// Amounts are per unit, in minor units of the cart currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Product identifier
    pub product_id: String,

    /// Display name
    pub name: String,

    /// Unit price
    pub unit_price: i64,

    /// Per-unit VAT amount
    pub vat: i64,

    /// Per-unit line discount
    pub discount: i64,

    /// Image reference
    pub image: Option<String>,

    /// Chosen variant
    pub variant_id: Option<String>,

    /// Chosen variant's display name
    pub variant_name: Option<String>,

    /// Remaining stock for the chosen variant, if known
    pub variant_stock: Option<u32>,

    /// Customer note ("ripe ones please")
    pub note: Option<String>,
}

impl NewItem {
    /// Create an item with just a product id, name and unit price.
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, unit_price: i64) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            vat: 0,
            discount: 0,
            image: None,
            variant_id: None,
            variant_name: None,
            variant_stock: None,
            note: None,
        }
    }

    /// Set the per-unit VAT.
    #[must_use]
    pub fn with_vat(mut self, vat: i64) -> Self {
        self.vat = vat;
        self
    }

    /// Set the per-unit line discount.
    #[must_use]
    pub fn with_discount(mut self, discount: i64) -> Self {
        self.discount = discount;
        self
    }

    /// Choose a variant.
    #[must_use]
    pub fn with_variant(
        mut self,
        variant_id: impl Into<String>,
        variant_name: impl Into<String>,
        stock: Option<u32>,
    ) -> Self {
        self.variant_id = Some(variant_id.into());
        self.variant_name = Some(variant_name.into());
        self.variant_stock = stock;
        self
    }

    /// Attach a customer note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// The key this item will be stored under.
    pub fn key(&self) -> LineItemKey {
        LineItemKey::derive(
            &self.product_id,
            self.variant_id.as_deref(),
            self.note.as_deref(),
        )
    }
}

/// A product placed in the cart with a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    unique_id: LineItemKey,
    item: NewItem,
    qty: u32,
}

impl LineItem {
    /// Create a line item; returns `None` for a zero quantity.
    pub fn new(item: NewItem, qty: u32) -> Option<Self> {
        (qty > 0).then(|| Self {
            unique_id: item.key(),
            item,
            qty,
        })
    }

    /// Uniqueness key
    pub fn unique_id(&self) -> &LineItemKey {
        &self.unique_id
    }

    /// Product identifier
    pub fn product_id(&self) -> &str {
        &self.item.product_id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.item.name
    }

    /// Unit price in minor units
    pub fn unit_price(&self) -> i64 {
        self.item.unit_price
    }

    /// Per-unit VAT in minor units
    pub fn vat(&self) -> i64 {
        self.item.vat
    }

    /// Per-unit line discount in minor units
    pub fn discount(&self) -> i64 {
        self.item.discount
    }

    /// Quantity, always at least one
    pub fn qty(&self) -> u32 {
        self.qty
    }

    /// Image reference
    pub fn image(&self) -> Option<&str> {
        self.item.image.as_deref()
    }

    /// Chosen variant
    pub fn variant_id(&self) -> Option<&str> {
        self.item.variant_id.as_deref()
    }

    /// Chosen variant's display name
    pub fn variant_name(&self) -> Option<&str> {
        self.item.variant_name.as_deref()
    }

    /// Remaining stock for the chosen variant, if known
    pub fn variant_stock(&self) -> Option<u32> {
        self.item.variant_stock
    }

    /// Customer note
    pub fn note(&self) -> Option<&str> {
        self.item.note.as_deref()
    }

    /// `unit_price × qty`, saturating (with a warning) on overflow
    pub fn line_total(&self) -> i64 {
        self.times_qty(self.item.unit_price, "price")
    }

    /// `vat × qty`, saturating (with a warning) on overflow
    pub fn line_vat(&self) -> i64 {
        self.times_qty(self.item.vat, "vat")
    }

    /// `discount × qty`, saturating (with a warning) on overflow
    pub fn line_discount(&self) -> i64 {
        self.times_qty(self.item.discount, "discount")
    }

    /// Whether the quantity exceeds the known variant stock.
    pub fn exceeds_stock(&self) -> bool {
        self.item
            .variant_stock
            .is_some_and(|stock| self.qty > stock)
    }

    pub(crate) fn add_qty(&mut self, qty: u32) {
        self.qty = self.qty.checked_add(qty).unwrap_or_else(|| {
            warn!(key = %self.unique_id, qty = self.qty, added = qty, "line quantity saturated");
            u32::MAX
        });
    }

    fn times_qty(&self, per_unit: i64, amount: &'static str) -> i64 {
        per_unit
            .checked_mul(i64::from(self.qty))
            .unwrap_or_else(|| {
                warn!(key = %self.unique_id, amount, per_unit, qty = self.qty, "line amount saturated");
                per_unit.saturating_mul(i64::from(self.qty))
            })
    }

    /// Lower the quantity by one; returns `false` when the item should be removed instead.
    pub(crate) fn take_one(&mut self) -> bool {
        if self.qty > 1 {
            self.qty -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_qty(&mut self, qty: u32) {
        debug_assert!(qty > 0, "line item quantity must stay positive");
        self.qty = qty;
    }
}

/// A product as served by the catalogue API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Public product id
    #[serde(default)]
    pub id: Option<String>,

    /// Storage id, preferred over `id` when both are present
    #[serde(rename = "_id", default)]
    pub object_id: Option<String>,

    /// Display name
    pub name: String,

    /// Unit price in major units
    pub price: Decimal,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Per-unit VAT in major units
    #[serde(default)]
    pub vat: Decimal,

    /// Per-unit markdown in major units
    #[serde(default)]
    pub discount: Decimal,

    /// Chosen variant
    #[serde(default)]
    pub variant_id: Option<String>,

    /// Chosen variant's display name
    #[serde(default)]
    pub variant_name: Option<String>,

    /// Remaining stock for the chosen variant
    #[serde(default)]
    pub variant_stock: Option<u32>,

    /// Customer note
    #[serde(default)]
    pub note: Option<String>,
}

impl ProductRecord {
    /// Convert the record into a [`NewItem`] priced in `currency`.
    ///
    /// # Errors
    ///
    /// - [`ItemError::MissingId`]: neither `_id` nor `id` is set to a non-blank value.
    /// - [`ItemError::Amount`]: an amount does not fit in minor units.
    pub fn into_new_item(self, currency: &Currency) -> Result<NewItem, ItemError> {
        let usable = |id: &String| !id.trim().is_empty();
        let product_id = self
            .object_id
            .filter(usable)
            .or(self.id.filter(usable))
            .ok_or(ItemError::MissingId)?;

        Ok(NewItem {
            product_id,
            name: self.name,
            unit_price: to_minor(self.price, currency)?,
            vat: to_minor(self.vat, currency)?,
            discount: to_minor(self.discount, currency)?,
            image: self.image,
            variant_id: self.variant_id,
            variant_name: self.variant_name,
            variant_stock: self.variant_stock,
            note: self.note,
        })
    }
}
