//! Admin handlers for the catalog and order fulfilment.
//!
//! Every handler requires the `ADMINS` group. Product updates set stock
//! directly and are not coordinated with in-flight checkouts; a checkout
//! racing an edit fails its conditional decrement and asks the customer to
//! retry.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use filament_shop_core::{Order, OrderId, OrderStatus, Product, ProductId, ProductInput};

use super::products::with_image_url;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Create a product.
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = state.store().create_product(input).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(with_image_url(state.images(), product)),
    ))
}

/// Replace a product, including its stock count.
#[instrument(skip_all, fields(admin = %admin.email, product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = state
        .store()
        .update_product(&ProductId::new(id), input)
        .await
        .map_err(AppError::not_found_as("product"))?;
    Ok(Json(with_image_url(state.images(), product)))
}

/// Delete a product. Existing orders keep their line snapshots.
#[instrument(skip_all, fields(admin = %admin.email, product_id = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if state.store().delete_product(&ProductId::new(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("product".to_string()))
    }
}

/// Body of a status change. Accepts a status code or its display label.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Move an order to a new fulfilment status.
#[instrument(skip_all, fields(admin = %admin.email, order_id = %id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let status = OrderStatus::from_code_or_label(&update.status)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status: {}", update.status)))?;

    let order = state
        .store()
        .update_order_status(&OrderId::new(id), status)
        .await
        .map_err(AppError::not_found_as("order"))?;
    tracing::info!(status = %order.status, "order status updated");
    Ok(Json(order))
}
