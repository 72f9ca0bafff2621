//! Checkout Example
//!
//! Loads a fixture set, applies an optional coupon and prints the receipt for the resulting order.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to apply a coupon code
//! Use `-p` to choose the payment method (defaults to cash on delivery)
//! Use `--json` to also print the order payload
//!
//! Set `RUST_LOG=grocer=debug` to see cart and coupon decisions.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use jiff::Timestamp;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use grocer::{
    checkout::{PaymentMethod, build_order_payload},
    coupons::validate,
    fixtures::Fixture,
    receipt::Receipt,
    utils::DemoArgs,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init()?;

    let args = DemoArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let cart = fixture.cart()?;
    let now = Timestamp::now();

    let applied = match args.coupon.as_deref() {
        Some(code) => match validate(fixture.coupons(), code, cart.totals().sub_total, now) {
            Ok(applied) => Some(applied),
            Err(error) => {
                println!("Coupon {code} not applied: {error}");
                None
            }
        },
        None => None,
    };

    let payload = build_order_payload(
        &cart,
        applied.as_ref(),
        fixture.address(),
        Some(args.payment.unwrap_or(PaymentMethod::CashOnDelivery)),
        fixture.delivery_slot(),
        now,
    )?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::new(&payload, cart.currency()).write_to(&mut handle)?;

    if args.json {
        serde_json::to_writer_pretty(&mut handle, &payload)?;
        writeln!(handle)?;
    }

    Ok(())
}
