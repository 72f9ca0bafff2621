//! Grocer prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addresses::{Address, AddressBook, AddressField, AddressKey},
    cart::{Cart, CartTotals, snapshot::CartSnapshot},
    checkout::{DeliverySlot, OrderPayload, PaymentMethod, ValidationError, build_order_payload},
    config::{ConfigError, PricingConfig},
    coupons::{AppliedCoupon, Coupon, CouponError, CouponRecord, validate},
    favorites::Favorites,
    items::{ItemError, LineItem, LineItemKey, NewItem, ProductRecord},
    money::MoneyConversionError,
    receipt::{Receipt, ReceiptError},
    reducer::{CartAction, reduce},
    shipping::ShippingPolicy,
    storage::{FileStore, KeyValueStore, MemoryStore, StoreError, load_cart, save_cart},
};
