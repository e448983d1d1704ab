//! Order placement with stock reservation.
//!
//! The workflow is:
//!
//! 1. Normalize the submitted line items (merge duplicates, reject bad quantities)
//! 2. Read every referenced product and check stock
//! 3. Price the order from the fetched products
//! 4. Write the order with status [`OrderStatus::Created`]
//! 5. Decrement stock per product with a compare-and-set against the value read in step 2
//! 6. Notify the operator and the customer on a background task (best effort)
//!
//! A rejected compare-and-set means another checkout or an admin edit touched
//! the product in between. The decrements already applied by this request are
//! restored, the order is cancelled, and the caller gets a retryable failure.
//! Stock never goes negative and two checkouts can never both take the last
//! unit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, error, info, instrument, warn};

use filament_shop_core::{
    Email, EmailError, LineItemError, NewOrder, Order, OrderId, OrderLine, OrderStatus, Product,
    ProductId, ShippingAddress, UserProfile, order::normalize_line_items, order::order_total,
};

use super::notifications::OrderNotifier;
use crate::db::{CatalogStore, OrderStore, RepositoryError};

/// Message returned on success.
pub const OK_MESSAGE: &str = "OK";

/// Checkout payload as sent by the storefront client.
///
/// Every field is optional on the wire so that malformed submissions still
/// produce a structured failure instead of a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceOrderRequest {
    /// Caller-chosen order number; generated when absent.
    pub order_number: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    /// RFC 3339 timestamp; the server clock is used when absent or invalid.
    pub date: Option<String>,
    /// Array or JSON-encoded array of line items.
    pub items: Value,
    /// Structured address, free text, or a JSON-encoded string of either.
    pub address: Value,
    /// Client-computed total. Ignored; the total is recomputed.
    pub total: Option<Value>,
}

/// Result shape returned to the client for every checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub ok: bool,
    /// Store-assigned order id; empty on failure.
    pub order_id: String,
    pub message: String,
}

impl PlaceOrderResponse {
    #[must_use]
    pub fn success(order_id: &OrderId) -> Self {
        Self {
            ok: true,
            order_id: order_id.to_string(),
            message: OK_MESSAGE.to_owned(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            order_id: String::new(),
            message: message.into(),
        }
    }
}

impl From<&PlaceOrderError> for PlaceOrderResponse {
    fn from(err: &PlaceOrderError) -> Self {
        Self::failure(err.to_string())
    }
}

/// Why a checkout failed. `Display` is the customer-facing message.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("Shporta është bosh.")]
    EmptyCart,

    #[error("Sasi e pavlefshme.")]
    InvalidQuantity,

    #[error("Email i pavlefshëm.")]
    InvalidEmail(#[source] EmailError),

    #[error("Produkti nuk u gjet.")]
    ProductNotFound(ProductId),

    #[error("Sasia e kërkuar për \"{name}\" tejkalon stokun.")]
    InsufficientStock { product_id: ProductId, name: String },

    #[error("Porosia nuk u krijua.")]
    OrderNotCreated(#[source] RepositoryError),

    /// Stock changed between the read and the conditional decrement.
    #[error("Sasia ndryshoi gjatë procesimit. Ju lutem provoni përsëri.")]
    ConcurrentModification { product_id: ProductId },

    #[error("Gabim i panjohur.")]
    Store(#[from] RepositoryError),
}

impl PlaceOrderError {
    /// Whether submitting the same cart again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    /// Whether the failure is on our side rather than in the submitted cart.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::OrderNotCreated(_) | Self::Store(_))
    }
}

impl From<LineItemError> for PlaceOrderError {
    fn from(err: LineItemError) -> Self {
        match err {
            LineItemError::Empty => Self::EmptyCart,
            LineItemError::InvalidQuantity => Self::InvalidQuantity,
        }
    }
}

/// Place an order and always answer with a [`PlaceOrderResponse`].
#[instrument(skip_all, fields(order_id = tracing::field::Empty))]
pub async fn place_order<S>(
    store: &S,
    notifier: &Arc<dyn OrderNotifier>,
    request: PlaceOrderRequest,
) -> PlaceOrderResponse
where
    S: CatalogStore + OrderStore + ?Sized,
{
    match try_place_order(store, notifier, request).await {
        Ok(order) => {
            tracing::Span::current().record("order_id", order.id.as_str());
            PlaceOrderResponse::success(&order.id)
        }
        Err(e) => {
            if e.is_server_error() {
                error!(error = ?e, "checkout failed");
            } else {
                info!(reason = %e, "checkout rejected");
            }
            PlaceOrderResponse::from(&e)
        }
    }
}

/// Place an order, returning the persisted order on success.
///
/// # Errors
///
/// Returns a [`PlaceOrderError`] describing the first failed step. Nothing is
/// written for validation or stock failures; see the module docs for what
/// happens when a conditional decrement is rejected.
pub async fn try_place_order<S>(
    store: &S,
    notifier: &Arc<dyn OrderNotifier>,
    request: PlaceOrderRequest,
) -> Result<Order, PlaceOrderError>
where
    S: CatalogStore + OrderStore + ?Sized,
{
    let requested = normalize_line_items(&request.items)?;
    let customer_email =
        Email::parse(&request.customer_email).map_err(PlaceOrderError::InvalidEmail)?;

    let mut reserved: Vec<(Product, u32)> = Vec::with_capacity(requested.len());
    for line in requested {
        let product = store
            .get_product(&line.product_id)
            .await?
            .ok_or_else(|| PlaceOrderError::ProductNotFound(line.product_id.clone()))?;

        if line.quantity > product.stock {
            let name = if product.name.trim().is_empty() {
                "produkt".to_owned()
            } else {
                product.name.clone()
            };
            return Err(PlaceOrderError::InsufficientStock {
                product_id: product.id,
                name,
            });
        }
        reserved.push((product, line.quantity));
    }

    let items: Vec<OrderLine> = reserved
        .iter()
        .map(|(product, quantity)| OrderLine::snapshot(product, *quantity))
        .collect();
    let customer_name = match request.customer_name.trim() {
        "" => UserProfile::default_name(&customer_email),
        name => name.to_owned(),
    };

    let new_order = NewOrder {
        order_number: request
            .order_number
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(generate_order_number),
        customer_name,
        customer_email,
        total: order_total(&items),
        date: parse_order_date(request.date.as_deref()),
        status: OrderStatus::Created,
        items,
        address: ShippingAddress::from_submitted(request.address),
    };

    let order = store
        .create_order(new_order)
        .await
        .map_err(PlaceOrderError::OrderNotCreated)?;

    // (product, stock before, stock after) for each decrement that landed
    let mut applied: Vec<(ProductId, u32, u32)> = Vec::with_capacity(reserved.len());
    for (product, quantity) in &reserved {
        let observed = product.stock;
        let remaining = observed - quantity;

        let outcome = store
            .compare_and_set_stock(&product.id, observed, remaining)
            .await;
        match outcome {
            Ok(true) => applied.push((product.id.clone(), observed, remaining)),
            Ok(false) => {
                warn!(
                    order_id = %order.id,
                    product_id = %product.id,
                    "stock changed during checkout, cancelling order"
                );
                compensate(store, &order.id, &applied).await;
                return Err(PlaceOrderError::ConcurrentModification {
                    product_id: product.id.clone(),
                });
            }
            Err(e) => {
                compensate(store, &order.id, &applied).await;
                return Err(PlaceOrderError::Store(e));
            }
        }
    }

    info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total = %order.total,
        lines = order.items.len(),
        "order placed"
    );

    let notifier = Arc::clone(notifier);
    let placed = order.clone();
    tokio::spawn(async move { notifier.order_placed(&placed).await }.in_current_span());

    Ok(order)
}

/// Undo this request's decrements and cancel its order.
///
/// Each restore is itself conditional: if a later checkout already consumed
/// the stock we released, the restore is skipped and logged rather than
/// overwriting that checkout's decrement.
async fn compensate<S>(store: &S, order_id: &OrderId, applied: &[(ProductId, u32, u32)])
where
    S: CatalogStore + OrderStore + ?Sized,
{
    for (product_id, before, after) in applied.iter().rev() {
        match store.compare_and_set_stock(product_id, *after, *before).await {
            Ok(true) => {}
            Ok(false) => error!(
                %order_id,
                %product_id,
                expected = after,
                restore_to = before,
                "could not restore stock, manual correction needed"
            ),
            Err(e) => error!(
                %order_id,
                %product_id,
                error = %e,
                "failed to restore stock"
            ),
        }
    }

    if let Err(e) = store
        .update_order_status(order_id, OrderStatus::Cancelled)
        .await
    {
        error!(%order_id, error = %e, "failed to cancel order after stock conflict");
    }
}

fn generate_order_number() -> String {
    format!("ORD-{}", Utc::now().timestamp_millis())
}

fn parse_order_date(date: Option<&str>) -> DateTime<Utc> {
    date.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map_or_else(Utc::now, |d| d.with_timezone(&Utc))
}
