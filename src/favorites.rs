//! Favorites

use serde::{Deserialize, Serialize};

/// Product ids the customer has hearted, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    products: Vec<String>,
}

impl Favorites {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a product in or out of the list; returns whether it is now a favorite.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.remove(product_id) {
            false
        } else {
            self.products.push(product_id.to_string());
            true
        }
    }

    /// Drop a product; returns whether it was present.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|id| id != product_id);

        self.products.len() != before
    }

    /// Whether the product is a favorite.
    pub fn contains(&self, product_id: &str) -> bool {
        self.products.iter().any(|id| id == product_id)
    }

    /// Favorite product ids.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(String::as_str)
    }

    /// Number of favorites.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether there are no favorites.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
