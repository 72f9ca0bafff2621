//! Utils

use clap::Parser;

use crate::checkout::PaymentMethod;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to load the cart, products, config & coupons from
    #[clap(short, long, default_value = "grocery")]
    pub fixture: String,

    /// Coupon code to apply
    #[clap(short, long)]
    pub coupon: Option<String>,

    /// Payment method (`cod`, `card` or `mobile_wallet`)
    #[clap(short, long)]
    pub payment: Option<PaymentMethod>,

    /// Also print the order payload as JSON
    #[clap(long)]
    pub json: bool,
}
