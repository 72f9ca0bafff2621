//! Grocer
//!
//! Grocer prices a grocery delivery cart. It keeps line items merged by product, variant and note,
//! recomputes subtotal, VAT, shipping, discount and total after every change, validates coupons
//! against the subtotal and assembles the order payload sent at checkout.

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod discounts;
pub mod favorites;
pub mod fixtures;
pub mod items;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod reducer;
pub mod shipping;
pub mod storage;
pub mod utils;
