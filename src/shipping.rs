//! Shipping Policy

/// How much delivery costs for a given cart subtotal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Flat delivery fee in minor units
    pub fee: i64,

    /// Subtotal (minor units) at or above which delivery is free
    pub free_over: Option<i64>,
}

impl ShippingPolicy {
    /// Delivery is always free
    #[must_use]
    pub const fn free() -> Self {
        Self {
            fee: 0,
            free_over: None,
        }
    }

    /// Flat fee regardless of subtotal
    #[must_use]
    pub const fn flat(fee: i64) -> Self {
        Self {
            fee,
            free_over: None,
        }
    }

    /// Flat fee, waived once the subtotal reaches `threshold`
    #[must_use]
    pub const fn flat_with_threshold(fee: i64, threshold: i64) -> Self {
        Self {
            fee,
            free_over: Some(threshold),
        }
    }

    /// Shipping charge for a cart with `item_count` lines and the given subtotal.
    ///
    /// An empty cart ships for nothing.
    #[must_use]
    pub fn charge(&self, sub_total: i64, item_count: usize) -> i64 {
        if item_count == 0 {
            return 0;
        }

        match self.free_over {
            Some(threshold) if sub_total >= threshold => 0,
            _ => self.fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_policy_never_charges() {
        assert_eq!(ShippingPolicy::free().charge(100, 1), 0);
    }

    #[test]
    fn flat_policy_charges_fee() {
        let policy = ShippingPolicy::flat(6_000);

        assert_eq!(policy.charge(1, 1), 6_000);
        assert_eq!(policy.charge(10_000_000, 3), 6_000);
    }

    #[test]
    fn threshold_is_inclusive() {
        let policy = ShippingPolicy::flat_with_threshold(6_000, 100_000);

        assert_eq!(policy.charge(99_999, 2), 6_000);
        assert_eq!(policy.charge(100_000, 2), 0);
    }

    #[test]
    fn empty_cart_ships_free() {
        assert_eq!(ShippingPolicy::flat(6_000).charge(0, 0), 0);
    }
}
