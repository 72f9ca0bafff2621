//! Property tests for cart invariants.
//!
//! Random sequences of cart actions must always leave the cart with:
//!
//! - one line per key, each with a quantity of at least one
//! - totals equal to a fresh recomputation over the current lines
//! - a total that never drops below zero
//!
//! Coupon validation is checked for determinism and for never granting more than the subtotal
//! on percentage coupons.

use decimal_percentage::Percentage;
use grocer::{
    cart::Cart,
    coupons::{Coupon, validate},
    items::{LineItemKey, NewItem},
    pricing::{grand_total, sum_lines},
    reducer::{CartAction, reduce},
    shipping::ShippingPolicy,
};
use jiff::Timestamp;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::BDT};

/// (product id, unit price, unit VAT, unit markdown) in paisa
const CATALOGUE: [(&str, i64, i64, i64); 5] = [
    ("rice", 45_000, 0, 0),
    ("eggs", 15_000, 0, 500),
    ("mango", 25_000, 1_250, 2_000),
    ("chillies", 3_000, 150, 0),
    ("clearance", 1_000, 0, 5_000),
];

const SHIPPING: ShippingPolicy = ShippingPolicy::flat_with_threshold(6_000, 150_000);

fn item_strategy() -> impl Strategy<Value = NewItem> {
    (
        prop::sample::select(CATALOGUE.to_vec()),
        prop::option::of(prop::sample::select(vec!["500g", "1kg"])),
        prop::option::of(prop::sample::select(vec!["ripe ones", "green ones"])),
    )
        .prop_map(|((id, price, vat, discount), variant, note)| {
            let mut item = NewItem::new(id, id, price)
                .with_vat(vat)
                .with_discount(discount);

            if let Some(variant) = variant {
                item = item.with_variant(variant, variant, Some(3));
            }

            if let Some(note) = note {
                item = item.with_note(note);
            }

            item
        })
}

fn key_strategy() -> impl Strategy<Value = LineItemKey> {
    item_strategy().prop_map(|item| item.key())
}

fn action_strategy() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        6 => (item_strategy(), 0u32..5).prop_map(|(item, qty)| CartAction::Add { item, qty }),
        2 => key_strategy().prop_map(CartAction::Increment),
        2 => key_strategy().prop_map(CartAction::Decrement),
        1 => key_strategy().prop_map(CartAction::Remove),
        2 => (key_strategy(), 0u32..5).prop_map(|(key, qty)| CartAction::SetQuantity(key, qty)),
        1 => Just(CartAction::Reset),
    ]
}

fn run(actions: Vec<CartAction>) -> Cart<'static> {
    actions
        .into_iter()
        .fold(Cart::new(BDT, SHIPPING), |cart, action| reduce(cart, action))
}

fn percentage_coupon(basis_points: i64, cap: i64) -> Coupon<'static> {
    Coupon {
        id: "c1".to_string(),
        code: "PCT".to_string(),
        is_active: true,
        valid_from: Timestamp::UNIX_EPOCH,
        valid_till: Timestamp::MAX,
        min_order_value: Money::from_minor(0, BDT),
        is_flat: false,
        max_amount: Money::from_minor(cap, BDT),
        percentage: Percentage::from(Decimal::new(basis_points, 4)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn lines_have_positive_quantities_and_unique_keys(
        actions in prop::collection::vec(action_strategy(), 0..40)
    ) {
        let cart = run(actions);

        for (index, line) in cart.items().iter().enumerate() {
            prop_assert!(line.qty() >= 1, "line {} has zero quantity", line.unique_id());
            prop_assert!(
                cart.items()
                    .iter()
                    .skip(index + 1)
                    .all(|other| other.unique_id() != line.unique_id()),
                "duplicate line {}",
                line.unique_id()
            );
        }
    }

    #[test]
    fn totals_match_recomputation(
        actions in prop::collection::vec(action_strategy(), 0..40)
    ) {
        let cart = run(actions);
        let sums = sum_lines(cart.items());
        let shipping = SHIPPING.charge(sums.sub_total, cart.len());
        let totals = cart.totals();

        prop_assert_eq!(totals.sub_total.to_minor_units(), sums.sub_total);
        prop_assert_eq!(totals.vat.to_minor_units(), sums.vat);
        prop_assert_eq!(totals.discount.to_minor_units(), sums.discount);
        prop_assert_eq!(totals.shipping.to_minor_units(), shipping);
        prop_assert_eq!(totals.total.to_minor_units(), grand_total(&sums, shipping));
    }

    #[test]
    fn total_is_never_negative(
        actions in prop::collection::vec(action_strategy(), 0..40)
    ) {
        let cart = run(actions);

        prop_assert!(cart.totals().total.to_minor_units() >= 0);
    }

    #[test]
    fn empty_cart_ships_free(
        actions in prop::collection::vec(action_strategy(), 0..40)
    ) {
        let cart = run(actions);

        if cart.is_empty() {
            prop_assert_eq!(cart.totals().shipping.to_minor_units(), 0);
            prop_assert_eq!(cart.totals().total.to_minor_units(), 0);
        }
    }

    #[test]
    fn adding_the_same_item_twice_merges(
        item in item_strategy(),
        first in 1u32..10,
        second in 1u32..10,
    ) {
        let mut cart = Cart::new(BDT, SHIPPING);

        cart.add_item(item.clone(), first);
        cart.add_item(item, second);

        prop_assert_eq!(cart.len(), 1);
        prop_assert_eq!(cart.item_count(), u64::from(first + second));
    }

    #[test]
    fn snapshot_restore_keeps_totals(
        actions in prop::collection::vec(action_strategy(), 0..40)
    ) {
        let cart = run(actions);
        let restored = Cart::restore(&cart.snapshot(), BDT, SHIPPING);

        prop_assert!(restored.is_ok());

        if let Ok(restored) = restored {
            prop_assert_eq!(restored.totals(), cart.totals());
            prop_assert_eq!(restored.items(), cart.items());
        }
    }

    #[test]
    fn percentage_coupons_are_deterministic_and_bounded(
        subtotal in 0i64..10_000_000,
        basis_points in 0i64..=10_000,
        cap in 0i64..100_000,
    ) {
        let coupons = [percentage_coupon(basis_points, cap)];
        let subtotal = Money::from_minor(subtotal, BDT);
        let now = Timestamp::UNIX_EPOCH;

        let first = validate(&coupons, "PCT", subtotal, now);
        let second = validate(&coupons, "PCT", subtotal, now);

        prop_assert_eq!(&first, &second);

        if let Ok(applied) = first {
            let discount = applied.discount.to_minor_units();

            prop_assert!(discount >= 0);
            prop_assert!(discount <= subtotal.to_minor_units());

            if cap > 0 {
                prop_assert!(discount <= cap);
            }
        }
    }
}
