//! Coupon Fixtures

use serde::Deserialize;

use crate::coupons::CouponRecord;

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupon records, in the API's shape
    pub coupons: Vec<CouponRecord>,
}
