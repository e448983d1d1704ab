//! Client-side cart state.
//!
//! The cart is advisory: quantities are clamped to the last-known stock of
//! each product, and checkout re-validates everything against live stock.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::order::RequestedLine;
use crate::types::{Money, ProductId};

/// A product held in the cart with a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

/// Ordered list of cart lines, one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add up to `quantity` units, never exceeding the product's stock.
    ///
    /// Returns how many units were actually added (zero means no-op).
    pub fn add(&mut self, product: &Product, quantity: u32) -> u32 {
        if quantity == 0 || product.stock == 0 {
            return 0;
        }
        let held = self.quantity_of(&product.id);
        let addable = product.stock.saturating_sub(held).min(quantity);
        if addable == 0 {
            return 0;
        }
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => item.quantity += addable,
            None => self.items.push(CartItem {
                product: product.clone(),
                quantity: addable,
            }),
        }
        addable
    }

    /// Change a line by `delta`, clamped to stock. A result of zero or less
    /// leaves the line unchanged; use [`Cart::remove`] to drop it.
    pub fn adjust_quantity(&mut self, product_id: &ProductId, delta: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.product.id == product_id) {
            let wanted = i64::from(item.quantity)
                .saturating_add(delta)
                .min(i64::from(item.product.stock));
            if let Ok(quantity) = u32::try_from(wanted)
                && quantity > 0
            {
                item.quantity = quantity;
            }
        }
    }

    /// Set a line's quantity, clamped to stock. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| &i.product.id == product_id) {
            item.quantity = quantity.min(item.product.stock);
        }
        self.items.retain(|i| i.quantity > 0);
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace held product snapshots with a fresh catalog and re-clamp.
    ///
    /// Lines whose product disappeared or sold out are dropped.
    pub fn refresh_stock(&mut self, catalog: &[Product]) {
        self.items.retain_mut(|item| {
            let Some(fresh) = catalog.iter().find(|p| p.id == item.product.id) else {
                return false;
            };
            item.product = fresh.clone();
            item.quantity = item.quantity.min(fresh.stock);
            item.quantity > 0
        });
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|i| &i.product.id == product_id)
            .map_or(0, |i| i.quantity)
    }

    /// Estimated total from last-known prices.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.product.price.times(i.quantity))
            .sum::<Money>()
            .rounded()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in the shape the checkout endpoint expects.
    #[must_use]
    pub fn line_items(&self) -> Vec<RequestedLine> {
        self.items
            .iter()
            .map(|i| RequestedLine {
                product_id: i.product.id.clone(),
                quantity: i.quantity,
            })
            .collect()
    }
}
