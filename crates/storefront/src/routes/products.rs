//! Public catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use filament_shop_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::services::ImageResolver;
use crate::state::AppState;

/// List all products, sorted by name.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.store().list_products().await?;
    Ok(Json(with_image_urls(state.images(), products)))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .store()
        .get_product(&ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    Ok(Json(with_image_url(state.images(), product)))
}

/// Replace the stored image reference with a fetchable URL.
pub(crate) fn with_image_url(images: &ImageResolver, mut product: Product) -> Product {
    product.image = images.resolve(&product.image);
    product
}

fn with_image_urls(images: &ImageResolver, products: Vec<Product>) -> Vec<Product> {
    products
        .into_iter()
        .map(|p| with_image_url(images, p))
        .collect()
}
