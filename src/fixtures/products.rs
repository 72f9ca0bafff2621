//! Product Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::items::ProductRecord;

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> catalogue record
    pub products: FxHashMap<String, ProductRecord>,
}
