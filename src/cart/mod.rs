//! Cart
//!
//! The cart owns an ordered list of [`LineItem`]s and the totals derived from them. Every mutation
//! rebuilds the totals from the item list, so no code path can leave them stale.

use rusty_money::{Money, iso::Currency};
use tracing::{debug, trace, warn};

use crate::{
    items::{LineItem, LineItemKey, NewItem},
    money::money,
    pricing::{grand_total, sum_lines},
    shipping::ShippingPolicy,
};

pub mod snapshot;

/// Totals derived from the cart's items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Σ `unit_price × qty`
    pub sub_total: Money<'a, Currency>,

    /// Σ `vat × qty`
    pub vat: Money<'a, Currency>,

    /// Delivery charge
    pub shipping: Money<'a, Currency>,

    /// Σ line-level discounts
    pub discount: Money<'a, Currency>,

    /// `sub_total + vat + shipping − discount`, never below zero
    pub total: Money<'a, Currency>,
}

impl<'a> CartTotals<'a> {
    /// All-zero totals in `currency`.
    pub fn zero(currency: &'a Currency) -> Self {
        let zero = money(0, currency);

        Self {
            sub_total: zero,
            vat: zero,
            shipping: zero,
            discount: zero,
            total: zero,
        }
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem>,
    currency: &'a Currency,
    shipping: ShippingPolicy,
    totals: CartTotals<'a>,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'a Currency, shipping: ShippingPolicy) -> Self {
        Cart {
            items: Vec::new(),
            currency,
            shipping,
            totals: CartTotals::zero(currency),
        }
    }

    /// Add `qty` units of an item.
    ///
    /// Merges into the existing line when one with the same key is present, otherwise appends a
    /// new line. Adding zero units does nothing.
    pub fn add_item(&mut self, item: NewItem, qty: u32) {
        let key = item.key();

        if qty == 0 {
            trace!(key = %key, "ignored zero-quantity add");
            return;
        }

        if let Some(line) = self.find_mut(&key) {
            line.add_qty(qty);
            debug!(key = %key, qty, total_qty = line.qty(), "merged item into cart line");
        } else if let Some(line) = LineItem::new(item, qty) {
            debug!(key = %key, qty, "added new cart line");
            self.items.push(line);
        }

        self.recompute();
    }

    /// Increase a line's quantity by one. Unknown keys are ignored.
    pub fn increment_item(&mut self, key: &LineItemKey) {
        if let Some(line) = self.find_mut(key) {
            line.add_qty(1);
            debug!(key = %key, qty = line.qty(), "incremented cart line");
            self.recompute();
        }
    }

    /// Decrease a line's quantity by one, removing the line when it would reach zero.
    pub fn decrement_item(&mut self, key: &LineItemKey) {
        let Some(line) = self.find_mut(key) else {
            return;
        };

        if line.take_one() {
            debug!(key = %key, qty = line.qty(), "decremented cart line");
            self.recompute();
        } else {
            self.remove_item(key);
        }
    }

    /// Remove a line regardless of its quantity.
    pub fn remove_item(&mut self, key: &LineItemKey) {
        let before = self.items.len();
        self.items.retain(|line| line.unique_id() != key);

        if self.items.len() != before {
            debug!(key = %key, "removed cart line");
            self.recompute();
        }
    }

    /// Set a line's absolute quantity; zero removes the line.
    pub fn set_item_quantity(&mut self, key: &LineItemKey, qty: u32) {
        if qty == 0 {
            self.remove_item(key);
            return;
        }

        if let Some(line) = self.find_mut(key) {
            line.set_qty(qty);
            debug!(key = %key, qty, "set cart line quantity");
            self.recompute();
        }
    }

    /// Empty the cart and zero its totals.
    pub fn reset(&mut self) {
        self.items.clear();
        self.totals = CartTotals::zero(self.currency);
        debug!("reset cart");
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by key.
    pub fn get(&self, key: &LineItemKey) -> Option<&LineItem> {
        self.items.iter().find(|line| line.unique_id() == key)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.qty())).sum()
    }

    /// Current totals.
    pub fn totals(&self) -> CartTotals<'a> {
        self.totals
    }

    /// Cart currency.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Shipping policy used for the `shipping` total.
    pub fn shipping_policy(&self) -> ShippingPolicy {
        self.shipping
    }

    /// Lines whose quantity is above the known variant stock.
    ///
    /// Stock is not enforced by the cart; callers decide what to show.
    pub fn over_stock(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|line| line.exceeds_stock())
    }

    fn find_mut(&mut self, key: &LineItemKey) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| line.unique_id() == key)
    }

    fn recompute(&mut self) {
        let sums = sum_lines(&self.items);
        let shipping = self.shipping.charge(sums.sub_total, self.items.len());
        let total = grand_total(&sums, shipping);

        self.totals = CartTotals {
            sub_total: money(sums.sub_total, self.currency),
            vat: money(sums.vat, self.currency),
            shipping: money(shipping, self.currency),
            discount: money(sums.discount, self.currency),
            total: money(total, self.currency),
        };

        trace!(
            sub_total = sums.sub_total,
            vat = sums.vat,
            shipping,
            discount = sums.discount,
            total,
            "recomputed cart totals"
        );

        for line in self.over_stock() {
            warn!(
                key = %line.unique_id(),
                qty = line.qty(),
                stock = ?line.variant_stock(),
                "cart line exceeds known variant stock"
            );
        }
    }
}
