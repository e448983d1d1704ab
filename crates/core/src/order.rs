//! Orders and the line items a checkout submits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::ShippingAddress;
use crate::catalog::Product;
use crate::types::{Email, FilamentType, Money, OrderId, OrderStatus, ProductId};

/// A product/quantity pair requested at checkout, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Why a submitted item list was rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemError {
    /// Nothing (or nothing parseable) was submitted.
    #[error("no line items")]
    Empty,
    /// A line lacks a product reference or has a non-positive quantity.
    #[error("invalid line item")]
    InvalidQuantity,
}

/// Parse and normalize a submitted item list.
///
/// Accepts a JSON array or a JSON-encoded string holding one. Each element
/// may be `{productId, quantity}` or a cart snapshot
/// `{product: {id, ..}, quantity}`. Lines for the same product are merged by
/// summing quantities, keeping first-seen order.
///
/// # Errors
///
/// - [`LineItemError::Empty`] if the list is missing, unparseable or empty.
/// - [`LineItemError::InvalidQuantity`] if any line has no product id, a
///   quantity that is not a positive integer, or merged quantities overflow.
pub fn normalize_line_items(submitted: &Value) -> Result<Vec<RequestedLine>, LineItemError> {
    let decoded;
    let value = match submitted {
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text).map_err(|_| LineItemError::Empty)?;
            &decoded
        }
        other => other,
    };
    let elements = value.as_array().ok_or(LineItemError::Empty)?;
    if elements.is_empty() {
        return Err(LineItemError::Empty);
    }

    let mut merged: Vec<RequestedLine> = Vec::with_capacity(elements.len());
    for element in elements {
        let product_id = line_product_id(element).ok_or(LineItemError::InvalidQuantity)?;
        let quantity = line_quantity(element).ok_or(LineItemError::InvalidQuantity)?;

        if let Some(existing) = merged.iter_mut().find(|l| l.product_id == product_id) {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(LineItemError::InvalidQuantity)?;
        } else {
            merged.push(RequestedLine {
                product_id,
                quantity,
            });
        }
    }
    Ok(merged)
}

fn line_product_id(element: &Value) -> Option<ProductId> {
    element
        .get("productId")
        .or_else(|| element.get("product").and_then(|p| p.get("id")))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ProductId::from)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn line_quantity(element: &Value) -> Option<u32> {
    let raw = element.get("quantity")?;
    let whole = match raw.as_u64() {
        Some(n) => n,
        None => {
            // Integral floats such as `3.0` are accepted; `2.5` and negatives are not.
            let f = raw.as_f64()?;
            if f.fract() != 0.0 || f < 1.0 || f > f64::from(u32::MAX) {
                return None;
            }
            f as u64
        }
    };
    u32::try_from(whole).ok().filter(|&q| q > 0)
}

/// One line of a placed order, denormalized for display and history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub name: String,
    #[serde(rename = "type")]
    pub filament_type: FilamentType,
    pub color: String,
    pub hex: String,
    pub weight: String,
}

impl OrderLine {
    /// Snapshot a product at its current price.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            unit_price: product.price,
            name: product.name.clone(),
            filament_type: product.filament_type,
            color: product.color.clone(),
            hex: product.hex.clone(),
            weight: product.weight.clone(),
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Sum of line totals, rounded to cents.
#[must_use]
pub fn order_total(lines: &[OrderLine]) -> Money {
    lines.iter().map(OrderLine::line_total).sum::<Money>().rounded()
}

/// An order to be written by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Email,
    pub total: Money,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub address: ShippingAddress,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Email,
    pub total: Money,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub address: ShippingAddress,
}

impl Order {
    /// Attach the store-assigned id.
    #[must_use]
    pub fn from_new(id: OrderId, new: NewOrder) -> Self {
        Self {
            id,
            order_number: new.order_number,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            total: new.total,
            date: new.date,
            status: new.status,
            items: new.items,
            address: new.address,
        }
    }
}

/// Newest first; ties broken by id, descending.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}
