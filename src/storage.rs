//! Storage
//!
//! Device persistence sits behind a small key-value interface. Platform adapters implement
//! [`KeyValueStore`]; the pricing core only ever hands them JSON strings.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, snapshot::CartSnapshot},
    config::PricingConfig,
    money::MoneyConversionError,
};

/// Errors raised by key-value stores and the helpers built on them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error from a file-backed store
    #[error("Failed to access store: {0}")]
    Io(#[from] io::Error),

    /// Stored value could not be (de)serialized
    #[error("Failed to encode or decode stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// Key is not usable by this store
    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    /// Stored cart amounts could not be converted
    #[error(transparent)]
    Money(#[from] MoneyConversionError),
}

/// A string key-value store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store, for tests and platforms without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);

        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the store, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    /// Directory backing the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if valid {
            Ok(self.dir.join(format!("{key}.json")))
        } else {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path_for(key)?, value)?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Serialize `value` as JSON under `key`.
///
/// # Errors
///
/// Returns a [`StoreError`] if encoding or writing fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value)?;

    store.set(key, &encoded).inspect_err(|error| {
        warn!(key, %error, "failed to persist value");
    })
}

/// Read and decode the JSON value under `key`, if present.
///
/// # Errors
///
/// Returns a [`StoreError`] if reading or decoding fails.
pub fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StoreError::from)
}

/// Persist a cart as a [`CartSnapshot`].
///
/// # Errors
///
/// Returns a [`StoreError`] if encoding or writing fails.
pub fn save_cart(
    store: &mut impl KeyValueStore,
    key: &str,
    cart: &Cart<'_>,
) -> Result<(), StoreError> {
    save_json(store, key, &cart.snapshot())?;
    debug!(key, lines = cart.len(), "saved cart");

    Ok(())
}

/// Restore a cart saved with [`save_cart`], priced with `config`.
///
/// # Errors
///
/// Returns a [`StoreError`] if reading, decoding or amount conversion fails.
pub fn load_cart(
    store: &impl KeyValueStore,
    key: &str,
    config: &PricingConfig,
) -> Result<Option<Cart<'static>>, StoreError> {
    let Some(snapshot) = load_json::<CartSnapshot>(store, key)? else {
        return Ok(None);
    };

    let cart = Cart::restore(&snapshot, config.currency, config.shipping)?;
    debug!(key, lines = cart.len(), "restored cart");

    Ok(Some(cart))
}
