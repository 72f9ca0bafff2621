//! Cart reducer
//!
//! The app's cart state expressed as `state + action -> state`, so UI code dispatches plain
//! [`CartAction`] values and tests can drive the cart without a UI.

use crate::{
    cart::Cart,
    items::{LineItemKey, NewItem},
};

/// A single cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add `qty` units of an item, merging with an existing line.
    Add {
        /// Item to add
        item: NewItem,
        /// Units to add
        qty: u32,
    },

    /// Add one unit to a line.
    Increment(LineItemKey),

    /// Remove one unit from a line, dropping it at zero.
    Decrement(LineItemKey),

    /// Drop a line entirely.
    Remove(LineItemKey),

    /// Set a line's quantity; zero drops it.
    SetQuantity(LineItemKey, u32),

    /// Empty the cart, e.g. after an order was placed.
    Reset,
}

impl Cart<'_> {
    /// Apply an action in place.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add { item, qty } => self.add_item(item, qty),
            CartAction::Increment(key) => self.increment_item(&key),
            CartAction::Decrement(key) => self.decrement_item(&key),
            CartAction::Remove(key) => self.remove_item(&key),
            CartAction::SetQuantity(key, qty) => self.set_item_quantity(&key, qty),
            CartAction::Reset => self.reset(),
        }
    }
}

/// Produce the next cart state from the current one and an action.
#[must_use]
pub fn reduce(mut cart: Cart<'_>, action: CartAction) -> Cart<'_> {
    cart.apply(action);
    cart
}
