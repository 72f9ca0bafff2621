//! Pricing
//!
//! Pure sums over line items. Everything here is recomputed from the item list on demand; nothing
//! is cached or updated incrementally.

use tracing::warn;

use crate::items::LineItem;

/// Sums of the per-line amounts, in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSums {
    /// Σ `unit_price × qty`
    pub sub_total: i64,

    /// Σ `vat × qty`
    pub vat: i64,

    /// Σ `discount × qty`
    pub discount: i64,
}

/// Sum subtotal, VAT and line discounts over a list of line items.
///
/// A sum that overflows is clamped to the `i64` range and logged.
pub fn sum_lines(items: &[LineItem]) -> LineSums {
    items.iter().fold(LineSums::default(), |acc, item| LineSums {
        sub_total: add_clamped(acc.sub_total, item.line_total(), "sub_total"),
        vat: add_clamped(acc.vat, item.line_vat(), "vat"),
        discount: add_clamped(acc.discount, item.line_discount(), "discount"),
    })
}

/// `sub_total + vat + shipping − discount`, floored at zero.
///
/// Overflow is clamped and logged like in [`sum_lines`].
pub fn grand_total(sums: &LineSums, shipping: i64) -> i64 {
    let gross = add_clamped(
        add_clamped(sums.sub_total, sums.vat, "total"),
        shipping,
        "total",
    );

    let net = gross.checked_sub(sums.discount).unwrap_or_else(|| {
        warn!(gross, discount = sums.discount, "total saturated");
        gross.saturating_sub(sums.discount)
    });

    net.max(0)
}

fn add_clamped(acc: i64, amount: i64, sum: &'static str) -> i64 {
    acc.checked_add(amount).unwrap_or_else(|| {
        warn!(sum, acc, amount, "sum saturated");
        acc.saturating_add(amount)
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::items::NewItem;

    use super::*;

    fn line(
        id: &str,
        price: i64,
        vat: i64,
        discount: i64,
        qty: u32,
    ) -> Result<LineItem, &'static str> {
        LineItem::new(
            NewItem::new(id, id, price)
                .with_vat(vat)
                .with_discount(discount),
            qty,
        )
        .ok_or("expected a line item")
    }

    #[test]
    fn sum_lines_empty_is_zero() {
        assert_eq!(sum_lines(&[]), LineSums::default());
    }

    #[test]
    fn sum_lines_multiplies_and_adds() -> TestResult {
        let items = [line("a", 10_000, 500, 0, 2)?, line("b", 4_000, 0, 1_000, 1)?];

        let sums = sum_lines(&items);

        assert_eq!(sums.sub_total, 24_000);
        assert_eq!(sums.vat, 1_000);
        assert_eq!(sums.discount, 1_000);

        Ok(())
    }

    #[test]
    fn grand_total_adds_shipping() {
        let sums = LineSums {
            sub_total: 10_000,
            vat: 500,
            discount: 0,
        };

        assert_eq!(grand_total(&sums, 6_000), 16_500);
    }

    #[test]
    fn sum_lines_clamps_overflowing_subtotal() -> TestResult {
        let items = [
            line("gold", i64::MAX / 2, 0, 0, 1)?,
            line("silver", i64::MAX / 2, 0, 0, 1)?,
            line("bronze", 10, 0, 0, 1)?,
        ];

        let sums = sum_lines(&items);

        assert_eq!(sums.sub_total, i64::MAX);

        Ok(())
    }

    #[test]
    fn grand_total_clamps_instead_of_wrapping() {
        let sums = LineSums {
            sub_total: i64::MAX,
            vat: 500,
            discount: 0,
        };

        assert_eq!(grand_total(&sums, 6_000), i64::MAX);

        let negative = LineSums {
            sub_total: 0,
            vat: 0,
            discount: i64::MIN,
        };

        assert_eq!(grand_total(&negative, 0), i64::MAX);
    }

    #[test]
    fn grand_total_never_negative() {
        let sums = LineSums {
            sub_total: 1_000,
            vat: 0,
            discount: 5_000,
        };

        assert_eq!(grand_total(&sums, 0), 0);
    }
}
