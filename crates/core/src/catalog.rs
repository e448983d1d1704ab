//! Catalog entities.

use serde::{Deserialize, Serialize};

use crate::types::{FilamentType, Money, ProductId};

/// Default swatch color when none was set.
pub const DEFAULT_HEX: &str = "#000000";

/// A filament spool offered in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "type")]
    pub filament_type: FilamentType,
    /// Color name shown to customers.
    pub color: String,
    /// Color hex code, e.g. `#FF5733`.
    pub hex: String,
    pub price: Money,
    /// Weight label, e.g. `1kg`.
    pub weight: String,
    pub description: String,
    /// Object-store path or absolute URL of the product image.
    #[serde(rename = "imageUrl")]
    pub image: String,
    pub available: bool,
    /// Custom text printed on the spool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub stock: u32,
}

impl Product {
    /// Build a product from validated admin input.
    #[must_use]
    pub fn from_input(id: ProductId, input: ProductInput) -> Self {
        Self {
            id,
            name: input.name,
            filament_type: input.filament_type,
            color: input.color,
            hex: input.hex,
            price: input.price,
            weight: input.weight,
            description: input.description,
            image: input.image,
            available: input.available,
            brand: input.brand,
            stock: input.stock,
        }
    }

    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Errors raised when validating [`ProductInput`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductInputError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
}

/// Admin payload for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(rename = "type", default)]
    pub filament_type: FilamentType,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_hex")]
    pub hex: String,
    pub price: Money,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: u32,
}

impl From<Product> for ProductInput {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            filament_type: product.filament_type,
            color: product.color,
            hex: product.hex,
            price: product.price,
            weight: product.weight,
            description: product.description,
            image: product.image,
            available: product.available,
            brand: product.brand,
            stock: product.stock,
        }
    }
}

fn default_hex() -> String {
    DEFAULT_HEX.to_owned()
}

impl ProductInput {
    /// Check invariants that serde alone does not enforce.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank name or a malformed hex color.
    pub fn validate(&self) -> Result<(), ProductInputError> {
        if self.name.trim().is_empty() {
            return Err(ProductInputError::EmptyName);
        }
        if !is_hex_color(&self.hex) {
            return Err(ProductInputError::InvalidHex(self.hex.clone()));
        }
        Ok(())
    }
}

/// `#RGB` or `#RRGGBB`.
fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        serde_json::from_value(serde_json::json!({
            "name": "PLA Mat Black",
            "type": "PLA",
            "price": 19.99,
            "stock": 12
        }))
        .unwrap()
    }

    #[test]
    fn test_input_defaults() {
        let input = input();
        assert_eq!(input.hex, DEFAULT_HEX);
        assert!(!input.available);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_input_validation() {
        let mut bad = input();
        bad.name = "  ".into();
        assert_eq!(bad.validate(), Err(ProductInputError::EmptyName));

        let mut bad = input();
        bad.hex = "#12345G".into();
        assert!(matches!(bad.validate(), Err(ProductInputError::InvalidHex(_))));

        let mut short = input();
        short.hex = "#fff".into();
        assert!(short.validate().is_ok());
    }

    #[test]
    fn test_negative_stock_is_rejected_by_type() {
        let parsed: Result<ProductInput, _> = serde_json::from_value(serde_json::json!({
            "name": "x", "price": 1, "stock": -1
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_product_wire_names() {
        let product = Product::from_input(ProductId::new("p1"), input());
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "PLA");
        assert_eq!(json["imageUrl"], "");
        assert!(json.get("brand").is_none());
    }

    #[test]
    fn test_product_back_to_input_keeps_fields() {
        let original = input();
        let product = Product::from_input(ProductId::new("p1"), original.clone());
        assert_eq!(ProductInput::from(product), original);
    }
}
