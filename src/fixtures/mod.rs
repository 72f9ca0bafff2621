//! Fixtures
//!
//! Named YAML fixture sets under `fixtures/`:
//!
//! - `config/<name>.yml`: [`PricingConfig`]
//! - `products/<name>.yml`: catalogue records keyed by a short name
//! - `carts/<name>.yml`: cart lines referencing products, plus delivery details
//! - `coupons/<name>.yml`: coupon records as served by the API

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    addresses::Address,
    cart::Cart,
    checkout::DeliverySlot,
    config::{ConfigError, PricingConfig},
    coupons::Coupon,
    fixtures::{
        carts::{CartFixture, CartLineFixture},
        coupons::CouponsFixture,
        products::ProductsFixture,
    },
    items::{ItemError, NewItem, ProductRecord},
    money::MoneyConversionError,
};

pub mod carts;
pub mod coupons;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Pricing configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Product record could not become a cart item
    #[error(transparent)]
    Item(#[from] ItemError),

    /// Coupon amount could not be converted
    #[error(transparent)]
    Money(#[from] MoneyConversionError),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No pricing configuration loaded yet
    #[error("No pricing config loaded yet; currency unknown")]
    NoConfig,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    config: Option<PricingConfig>,

    /// Short name -> catalogue record
    products: FxHashMap<String, ProductRecord>,

    lines: Vec<CartLineFixture>,
    address: Option<Address>,
    delivery_slot: Option<DeliverySlot>,

    coupons: Vec<Coupon<'static>>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            config: None,
            products: FxHashMap::default(),
            lines: Vec::new(),
            address: None,
            delivery_slot: None,
            coupons: Vec::new(),
        }
    }

    /// Load the pricing configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let path = self.path("config", name);

        self.config = Some(PricingConfig::load(path)?);

        Ok(self)
    }

    /// Load catalogue products
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.path("products", name))?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        self.products.extend(fixture.products);

        Ok(self)
    }

    /// Load cart lines and delivery details
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.path("carts", name))?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        self.lines.extend(fixture.lines);
        self.address = fixture.address.or(self.address.take());
        self.delivery_slot = fixture.delivery_slot.or(self.delivery_slot.take());

        Ok(self)
    }

    /// Load coupons, priced in the configured currency
    ///
    /// # Errors
    ///
    /// Returns an error if no config is loaded yet, or the file cannot be read or parsed.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.config()?.currency;
        let contents = fs::read_to_string(self.path("coupons", name))?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for record in fixture.coupons {
            self.coupons.push(record.into_coupon(currency)?);
        }

        Ok(self)
    }

    /// Load a complete fixture set (config, products, cart and coupons with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_config(name)?
            .load_products(name)?
            .load_cart(name)?
            .load_coupons(name)?;

        Ok(fixture)
    }

    /// Get the pricing configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no config has been loaded yet.
    pub fn config(&self) -> Result<&PricingConfig, FixtureError> {
        self.config.as_ref().ok_or(FixtureError::NoConfig)
    }

    /// Get a product as a cart item, priced in the configured currency
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown, no config is loaded, or the record is invalid.
    pub fn product(&self, key: &str) -> Result<NewItem, FixtureError> {
        let currency = self.config()?.currency;
        let record = self
            .products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))?;

        Ok(record.clone().into_new_item(currency)?)
    }

    /// Build a cart from the loaded cart lines
    ///
    /// # Errors
    ///
    /// Returns an error if a line references an unknown product or no config is loaded.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let mut cart = self.config()?.empty_cart();

        for line in &self.lines {
            let mut item = self.product(&line.product)?;

            if line.note.is_some() {
                item.note.clone_from(&line.note);
            }

            cart.add_item(item, line.qty);
        }

        Ok(cart)
    }

    /// Get all coupons
    pub fn coupons(&self) -> &[Coupon<'static>] {
        &self.coupons
    }

    /// Delivery address from the cart fixture
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Delivery slot from the cart fixture
    pub fn delivery_slot(&self) -> Option<&DeliverySlot> {
        self.delivery_slot.as_ref()
    }

    fn path(&self, category: &str, name: &str) -> PathBuf {
        self.base_path.join(category).join(format!("{name}.yml"))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
