//! Shipping addresses and the per-profile address book.
//!
//! The address book keeps one invariant: a non-empty book has exactly one
//! default address after every mutation.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::AddressId;

/// City sentinel meaning "not in the list"; the real name is in `custom_city`.
pub const OTHER_CITY: &str = "Tjetër";

/// A saved postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub country: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_city: Option<String>,
    #[serde(rename = "address")]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// City to print on a label, resolving the "other" sentinel.
    #[must_use]
    pub fn display_city(&self) -> &str {
        match self.custom_city.as_deref() {
            Some(custom) if self.city == OTHER_CITY && !custom.trim().is_empty() => custom,
            _ => &self.city,
        }
    }

    /// Full recipient name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}, {}",
            self.full_name(),
            self.street,
            self.display_city(),
            self.postal_code,
            self.country
        )?;
        if !self.phone.is_empty() {
            write!(f, " ({})", self.phone)?;
        }
        Ok(())
    }
}

/// An address submitted without an id or default flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub custom_city: Option<String>,
    #[serde(rename = "address")]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub phone: String,
}

impl NewAddress {
    fn into_address(self, id: AddressId, is_default: bool) -> Address {
        Address {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            country: self.country,
            city: self.city,
            custom_city: self.custom_city.filter(|c| !c.trim().is_empty()),
            street: self.street,
            postal_code: self.postal_code,
            phone: self.phone,
            is_default,
        }
    }
}

/// Destination of an order.
///
/// Signed-in customers ship to a structured address; guest checkouts may send
/// a single free-text line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShippingAddress {
    Structured(Address),
    FreeText(String),
}

impl ShippingAddress {
    /// Parse a submitted address that may itself be JSON-encoded text.
    ///
    /// A string that decodes to a structured address is treated as one;
    /// any other string is kept verbatim as free text.
    #[must_use]
    pub fn from_submitted(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|decoded| structured_address(&decoded))
                .map_or_else(|| Self::FreeText(decode_json_string(text)), Self::Structured),
            serde_json::Value::Null => Self::FreeText(String::new()),
            other => structured_address(&other)
                .map_or_else(|| Self::FreeText(other.to_string()), Self::Structured),
        }
    }
}

/// Read a saved address, or an id-less one as guests submit it. Guest
/// addresses get a fresh id and are never the default.
fn structured_address(value: &serde_json::Value) -> Option<Address> {
    if !value.is_object() {
        return None;
    }
    Address::deserialize(value)
        .ok()
        .or_else(|| {
            NewAddress::deserialize(value)
                .ok()
                .map(|new| new.into_address(AddressId::generate(), false))
        })
}

/// Unwrap text that was double-encoded as a JSON string literal.
fn decode_json_string(text: String) -> String {
    serde_json::from_str::<String>(&text).unwrap_or(text)
}

impl fmt::Display for ShippingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(address) => address.fmt(f),
            Self::FreeText(text) => f.write_str(text),
        }
    }
}

/// The address list owned by a user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook(Vec<Address>);

impl AddressBook {
    /// Wrap an existing list, repairing the default flag if needed.
    #[must_use]
    pub fn new(addresses: Vec<Address>) -> Self {
        let mut book = Self(addresses);
        book.normalize_default();
        book
    }

    /// Add an address. The first address in an empty book becomes default.
    pub fn add(&mut self, address: NewAddress) -> Address {
        let is_default = self.0.is_empty();
        let address = address.into_address(AddressId::generate(), is_default);
        self.0.push(address.clone());
        address
    }

    /// Replace the address with the same id. Returns `false` if absent.
    pub fn edit(&mut self, address: Address) -> bool {
        let Some(slot) = self.0.iter_mut().find(|a| a.id == address.id) else {
            return false;
        };
        let claims_default = address.is_default;
        let id = address.id.clone();
        *slot = address;
        if claims_default {
            self.set_default(&id);
        } else {
            self.normalize_default();
        }
        true
    }

    /// Make `id` the only default address. Returns `false` if absent.
    pub fn set_default(&mut self, id: &AddressId) -> bool {
        if !self.0.iter().any(|a| &a.id == id) {
            return false;
        }
        for address in &mut self.0 {
            address.is_default = &address.id == id;
        }
        true
    }

    /// Remove an address. Returns `false` if absent.
    pub fn delete(&mut self, id: &AddressId) -> bool {
        let before = self.0.len();
        self.0.retain(|a| &a.id != id);
        let removed = self.0.len() != before;
        if removed {
            self.normalize_default();
        }
        removed
    }

    /// The current default address, if any.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.0.iter().find(|a| a.is_default)
    }

    #[must_use]
    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.0.iter().find(|a| &a.id == id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Address> {
        self.0
    }

    /// Keep the first flagged address as default; promote the first entry
    /// when none is flagged.
    fn normalize_default(&mut self) {
        let keep = self.0.iter().position(|a| a.is_default).unwrap_or(0);
        for (i, address) in self.0.iter_mut().enumerate() {
            address.is_default = i == keep;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_address(street: &str) -> NewAddress {
        NewAddress {
            first_name: "Arta".into(),
            last_name: "Krasniqi".into(),
            email: String::new(),
            country: "Kosovë".into(),
            city: "Prishtinë".into(),
            custom_city: None,
            street: street.into(),
            postal_code: "10000".into(),
            phone: "+383 44 000 000".into(),
        }
    }

    fn defaults(book: &AddressBook) -> usize {
        book.as_slice().iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_first_address_is_default() {
        let mut book = AddressBook::default();
        let first = book.add(new_address("Rr. A")).id;
        book.add(new_address("Rr. B"));
        assert_eq!(book.default_address().unwrap().id, first);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_set_default_clears_others() {
        let mut book = AddressBook::default();
        book.add(new_address("Rr. A"));
        let second = book.add(new_address("Rr. B")).id;
        assert!(book.set_default(&second));
        assert_eq!(book.default_address().unwrap().id, second);
        assert_eq!(defaults(&book), 1);
        assert!(!book.set_default(&AddressId::new("missing")));
    }

    #[test]
    fn test_edit_in_place() {
        let mut book = AddressBook::default();
        book.add(new_address("Rr. A"));
        let mut second = book.add(new_address("Rr. B"));
        second.street = "Rr. C".into();
        second.is_default = true;
        assert!(book.edit(second.clone()));
        assert_eq!(book.get(&second.id).unwrap().street, "Rr. C");
        assert_eq!(book.default_address().unwrap().id, second.id);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_edit_cannot_drop_only_default() {
        let mut book = AddressBook::default();
        let mut only = book.add(new_address("Rr. A"));
        only.is_default = false;
        assert!(book.edit(only));
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_delete_default_promotes_next() {
        let mut book = AddressBook::default();
        let first = book.add(new_address("Rr. A")).id;
        let second = book.add(new_address("Rr. B")).id;
        assert!(book.delete(&first));
        assert_eq!(book.default_address().unwrap().id, second);
        assert!(book.delete(&second));
        assert!(book.is_empty());
        assert!(!book.delete(&second));
    }

    #[test]
    fn test_display_city_resolves_other() {
        let mut book = AddressBook::default();
        let mut na = new_address("Rr. A");
        na.city = OTHER_CITY.into();
        na.custom_city = Some("Hani i Elezit".into());
        let address = book.add(na);
        assert_eq!(address.display_city(), "Hani i Elezit");
    }

    #[test]
    fn test_shipping_address_from_submitted() {
        let mut book = AddressBook::default();
        let address = book.add(new_address("Rr. A"));
        let encoded = serde_json::to_string(&address).unwrap();

        let structured = ShippingAddress::from_submitted(serde_json::Value::String(encoded));
        assert_eq!(structured, ShippingAddress::Structured(address.clone()));

        let object = ShippingAddress::from_submitted(serde_json::to_value(&address).unwrap());
        assert_eq!(object, ShippingAddress::Structured(address));

        let text = ShippingAddress::from_submitted(serde_json::json!("\"Rr. X, Tiranë\""));
        assert_eq!(text, ShippingAddress::FreeText("Rr. X, Tiranë".into()));
    }

    #[test]
    fn test_guest_address_without_id_stays_structured() {
        let submitted = serde_json::json!({
            "firstName": "Arta",
            "lastName": "K",
            "country": "Kosovë",
            "city": "Prishtinë",
            "address": "Rr. 1",
            "postalCode": "10000",
            "phone": "+38344000000"
        });

        for value in [submitted.clone(), serde_json::Value::String(submitted.to_string())] {
            let ShippingAddress::Structured(address) = ShippingAddress::from_submitted(value)
            else {
                panic!("expected a structured address");
            };
            assert_eq!(address.street, "Rr. 1");
            assert_eq!(address.display_city(), "Prishtinë");
            assert!(!address.is_default);
            assert!(!address.id.as_str().is_empty());
        }
    }

    #[test]
    fn test_non_address_object_is_free_text() {
        let value = serde_json::json!({ "note": "leave at the door" });
        assert_eq!(
            ShippingAddress::from_submitted(value.clone()),
            ShippingAddress::FreeText(value.to_string())
        );
    }
}
