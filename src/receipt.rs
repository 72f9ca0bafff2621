//! Receipt

use std::{fmt::Write, io};

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    checkout::{OrderLine, OrderPayload},
    money::{MoneyConversionError, money, to_minor},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An amount could not be shown in the receipt currency.
    #[error(transparent)]
    Money(#[from] MoneyConversionError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of an order payload.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'p> {
    payload: &'p OrderPayload,
    currency: &'static Currency,
}

impl<'p> Receipt<'p> {
    /// Create a receipt for `payload`, whose amounts are in `currency`.
    pub fn new(payload: &'p OrderPayload, currency: &'static Currency) -> Self {
        Self { payload, currency }
    }

    /// The order being printed
    pub fn payload(&self) -> &'p OrderPayload {
        self.payload
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount does not fit the currency or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "VAT", "Total"]);

        for line in &self.payload.cart.items {
            builder.push_record(self.line_cells(line)?);
        }

        write_receipt_table(&mut out, builder)?;
        self.write_summary(&mut out)?;
        self.write_delivery(&mut out)
    }

    fn line_cells(&self, line: &OrderLine) -> Result<[String; 5], ReceiptError> {
        let mut name = line.name.clone();

        if let Some(variant) = &line.variant_name {
            _ = write!(name, " ({variant})");
        }

        if let Some(note) = &line.note {
            _ = write!(name, "\n  \u{201c}{note}\u{201d}");
        }

        let unit_vat = if line.unit_vat.is_zero() {
            String::new()
        } else {
            self.display(line.unit_vat)?
        };

        Ok([
            name,
            line.qty.to_string(),
            self.display(line.unit_price)?,
            unit_vat,
            self.display(line.total_price)?,
        ])
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let cart = &self.payload.cart;

        let mut rows = vec![
            SummaryRow::plain("Subtotal:", self.display(cart.sub_total)?),
            SummaryRow::plain("VAT:", self.display(cart.vat)?),
            SummaryRow::plain("Shipping:", self.display(cart.shipping)?),
        ];

        if !cart.discount.is_zero() {
            rows.push(SummaryRow::plain(
                "Discount:",
                format!("-{}", self.display(cart.discount)?),
            ));
        }

        rows.push(SummaryRow {
            label: "Total:",
            value: self.display(cart.total)?,
            bold: true,
        });

        let widths = SummaryWidths::fit(&rows);

        for row in &rows {
            write_summary_row(out, row, widths)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }

    fn write_delivery(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let payload = self.payload;
        let address = &payload.address;
        let slot = &payload.delivery_slot;

        writeln!(
            out,
            " Deliver to {}, {}, {}, {} on {} ({})",
            address.name, address.street, address.area, address.city, slot.date, slot.window
        )
        .map_err(|_err| ReceiptError::IO)?;

        writeln!(out, " Payment: {}", payload.payment_method).map_err(|_err| ReceiptError::IO)?;

        if let Some(coupon_id) = &payload.cart.coupon_id {
            writeln!(out, " Coupon: {coupon_id}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }

    fn display(&self, amount: Decimal) -> Result<String, ReceiptError> {
        let minor = to_minor(amount, self.currency)?;

        Ok(money(minor, self.currency).to_string())
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..5), Alignment::right());

    let table_str = dim_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

const DIM: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// One label/amount pair under the items table.
#[derive(Debug)]
struct SummaryRow {
    label: &'static str,
    value: String,
    bold: bool,
}

impl SummaryRow {
    fn plain(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            bold: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SummaryWidths {
    label: usize,
    value: usize,
}

impl SummaryWidths {
    fn fit(rows: &[SummaryRow]) -> Self {
        rows.iter().fold(
            Self { label: 0, value: 0 },
            |widths, row| Self {
                label: widths.label.max(row.label.chars().count()),
                value: widths.value.max(row.value.chars().count()),
            },
        )
    }
}

/// Both columns are right-aligned; styling wraps the padded text so it never affects alignment.
fn write_summary_row(
    out: &mut impl io::Write,
    row: &SummaryRow,
    widths: SummaryWidths,
) -> Result<(), ReceiptError> {
    let SummaryWidths { label: lw, value: vw } = widths;
    let (on, off) = if row.bold { (BOLD, RESET) } else { ("", "") };

    writeln!(
        out,
        " {on}{:>lw$}{off}  {on}{:>vw$}{off}",
        row.label, row.value
    )
    .map_err(|_err| ReceiptError::IO)
}

fn is_border(ch: char) -> bool {
    matches!(ch, '\u{2500}'..='\u{257F}')
}

/// Dims every run of box-drawing characters in a rendered table.
fn dim_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut rest = table;

    while let Some(start) = rest.find(is_border) {
        let (text, tail) = rest.split_at(start);
        let end = tail.find(|ch| !is_border(ch)).unwrap_or(tail.len());
        let (run, after) = tail.split_at(end);

        out.push_str(text);
        out.push_str(DIM);
        out.push_str(run);
        out.push_str(RESET);

        rest = after;
    }

    out.push_str(rest);
    out
}
