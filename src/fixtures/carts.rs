//! Cart Fixtures

use serde::Deserialize;

use crate::{addresses::Address, checkout::DeliverySlot};

/// A cart and the delivery details chosen for it
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines to add, in order
    #[serde(default)]
    pub lines: Vec<CartLineFixture>,

    /// Selected delivery address
    #[serde(default)]
    pub address: Option<Address>,

    /// Selected delivery slot
    #[serde(default)]
    pub delivery_slot: Option<DeliverySlot>,
}

/// One line of a cart fixture
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFixture {
    /// Product key in the products fixture
    pub product: String,

    /// Units to add
    pub qty: u32,

    /// Customer note for this line
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_lines_and_delivery_details() -> TestResult {
        let yaml = r"
lines:
  - product: rice
    qty: 2
address:
  name: Rahim Uddin
  phone: '01700000000'
  street: House 12
  area: Dhanmondi
  city: Dhaka
delivery_slot:
  date: 2026-06-16
  window: 10:00-12:00
";

        let fixture: CartFixture = serde_norway::from_str(yaml)?;

        assert_eq!(fixture.lines.len(), 1);
        assert!(fixture.address.ok_or("missing address")?.is_complete());
        assert_eq!(
            fixture.delivery_slot.ok_or("missing slot")?.window,
            "10:00-12:00"
        );

        Ok(())
    }
}
