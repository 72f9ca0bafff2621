//! Addresses

use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Address Key
    pub struct AddressKey;
}

/// A delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Recipient name
    pub name: String,

    /// Contact phone
    pub phone: String,

    /// Street / house
    pub street: String,

    /// Area or neighbourhood
    pub area: String,

    /// City
    pub city: String,

    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Required address fields, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    /// Recipient name
    Name,
    /// Contact phone
    Phone,
    /// Street / house
    Street,
    /// Area
    Area,
    /// City
    City,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressField::Name => "name",
            AddressField::Phone => "phone",
            AddressField::Street => "street",
            AddressField::Area => "area",
            AddressField::City => "city",
        })
    }
}

impl Address {
    /// The first required field that is blank, if any.
    pub fn first_missing(&self) -> Option<AddressField> {
        [
            (AddressField::Name, &self.name),
            (AddressField::Phone, &self.phone),
            (AddressField::Street, &self.street),
            (AddressField::Area, &self.area),
            (AddressField::City, &self.city),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// Whether every required field is filled in.
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }
}

/// The customer's saved addresses and which one is selected for delivery.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    addresses: SlotMap<AddressKey, Address>,
    order: Vec<AddressKey>,
    selected: Option<AddressKey>,
}

impl AddressBook {
    /// Create an empty address book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save an address. The first saved address becomes the selected one.
    pub fn add(&mut self, address: Address) -> AddressKey {
        let key = self.addresses.insert(address);
        self.order.push(key);

        if self.selected.is_none() {
            self.selected = Some(key);
        }

        key
    }

    /// Replace a saved address; returns `false` for unknown keys.
    pub fn update(&mut self, key: AddressKey, address: Address) -> bool {
        match self.addresses.get_mut(key) {
            Some(slot) => {
                *slot = address;
                true
            }
            None => false,
        }
    }

    /// Delete a saved address, clearing the selection if it pointed there.
    pub fn remove(&mut self, key: AddressKey) -> Option<Address> {
        let removed = self.addresses.remove(key)?;
        self.order.retain(|k| *k != key);

        if self.selected == Some(key) {
            self.selected = None;
        }

        Some(removed)
    }

    /// Select an address for delivery; returns `false` for unknown keys.
    pub fn select(&mut self, key: AddressKey) -> bool {
        let known = self.addresses.contains_key(key);

        if known {
            self.selected = Some(key);
        }

        known
    }

    /// The selected address.
    pub fn selected(&self) -> Option<&Address> {
        self.selected.and_then(|key| self.addresses.get(key))
    }

    /// Look up an address.
    pub fn get(&self, key: AddressKey) -> Option<&Address> {
        self.addresses.get(key)
    }

    /// Saved addresses in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = (AddressKey, &Address)> {
        self.order
            .iter()
            .filter_map(|key| self.addresses.get(*key).map(|address| (*key, address)))
    }

    /// Number of saved addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether no addresses are saved.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
