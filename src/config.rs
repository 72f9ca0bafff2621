//! Pricing configuration
//!
//! ```yaml
//! currency: BDT
//! shipping_fee: 60
//! free_shipping_over: 1000
//! ```

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::Cart,
    money::{MoneyConversionError, currency_from_code, to_minor},
    shipping::ShippingPolicy,
};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency or unrepresentable amount
    #[error(transparent)]
    Money(#[from] MoneyConversionError),
}

/// Raw configuration file contents
#[derive(Debug, Deserialize)]
struct PricingConfigFile {
    currency: String,

    #[serde(default)]
    shipping_fee: Decimal,

    #[serde(default)]
    free_shipping_over: Option<Decimal>,
}

/// Currency and shipping policy every cart is priced with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    /// Cart currency
    pub currency: &'static Currency,

    /// Delivery charge policy
    pub shipping: ShippingPolicy,
}

impl PricingConfig {
    /// Create a configuration.
    pub const fn new(currency: &'static Currency, shipping: ShippingPolicy) -> Self {
        Self { currency, shipping }
    }

    /// Parse YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is malformed, the currency is unknown or an amount
    /// does not fit in minor units.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: PricingConfigFile = serde_norway::from_str(yaml)?;
        let currency = currency_from_code(&file.currency)?;

        let fee = to_minor(file.shipping_fee, currency)?;
        let shipping = match file.free_shipping_over {
            Some(threshold) => {
                ShippingPolicy::flat_with_threshold(fee, to_minor(threshold, currency)?)
            }
            None => ShippingPolicy::flat(fee),
        };

        Ok(Self { currency, shipping })
    }

    /// Load YAML configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// A new empty cart priced with this configuration.
    pub fn empty_cart(&self) -> Cart<'static> {
        Cart::new(self.currency, self.shipping)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BDT;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_fee_and_threshold() -> TestResult {
        let config = PricingConfig::from_yaml_str(
            "currency: BDT\nshipping_fee: 60\nfree_shipping_over: 1000\n",
        )?;

        assert_eq!(config.currency, BDT);
        assert_eq!(
            config.shipping,
            ShippingPolicy::flat_with_threshold(6_000, 100_000)
        );

        Ok(())
    }

    #[test]
    fn fee_defaults_to_zero() -> TestResult {
        let config = PricingConfig::from_yaml_str("currency: GBP\n")?;

        assert_eq!(config.shipping, ShippingPolicy::free());

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let result = PricingConfig::from_yaml_str("currency: ZZZ\n");

        assert!(matches!(
            result,
            Err(ConfigError::Money(MoneyConversionError::UnknownCurrency(code))) if code == "ZZZ"
        ));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let result = PricingConfig::from_yaml_str("currency: [BDT");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn load_reads_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pricing.yml");
        fs::write(&path, "currency: BDT\nshipping_fee: 49.5\n")?;

        let config = PricingConfig::load(&path)?;

        assert_eq!(config.shipping, ShippingPolicy::flat(4_950));

        Ok(())
    }
}
