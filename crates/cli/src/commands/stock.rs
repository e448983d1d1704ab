//! Stock maintenance commands.

use tracing::{info, warn};

use filament_shop_core::{ProductId, ProductInput};
use filament_shop_storefront::db::CatalogStore;

use super::{CliError, connect};

/// Attempts before giving up on a contended adjustment.
const MAX_ATTEMPTS: usize = 5;

/// Overwrite a product's stock count.
///
/// # Errors
///
/// Returns `CliError::Invalid` if the product does not exist.
pub async fn set(product_id: &str, count: u32) -> Result<(), CliError> {
    let store = connect().await?;
    let previous = set_stock(&store, &ProductId::new(product_id), count).await?;
    info!(product_id, previous, stock = count, "Stock updated");
    Ok(())
}

/// Shift a product's stock by `delta` units.
///
/// # Errors
///
/// Returns `CliError::Invalid` if the product does not exist, the result
/// would leave the range of a stock count, or the row keeps changing.
pub async fn adjust(product_id: &str, delta: i64) -> Result<(), CliError> {
    let store = connect().await?;
    let stock = adjust_stock(&store, &ProductId::new(product_id), delta).await?;
    info!(product_id, delta, stock, "Stock adjusted");
    Ok(())
}

/// Replace the stock count, returning the previous one.
async fn set_stock<S: CatalogStore + ?Sized>(
    store: &S,
    id: &ProductId,
    count: u32,
) -> Result<u32, CliError> {
    let product = store
        .get_product(id)
        .await?
        .ok_or_else(|| CliError::Invalid(format!("product {id} not found")))?;
    let previous = product.stock;

    let mut input = ProductInput::from(product);
    input.stock = count;
    store.update_product(id, input).await?;
    Ok(previous)
}

/// Apply a relative change with compare-and-set, retrying when a checkout
/// moves the count underneath us. Returns the new count.
async fn adjust_stock<S: CatalogStore + ?Sized>(
    store: &S,
    id: &ProductId,
    delta: i64,
) -> Result<u32, CliError> {
    for attempt in 1..=MAX_ATTEMPTS {
        let current = store
            .get_product(id)
            .await?
            .ok_or_else(|| CliError::Invalid(format!("product {id} not found")))?
            .stock;

        let next = i64::from(current)
            .checked_add(delta)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                CliError::Invalid(format!(
                    "cannot apply {delta} to stock {current} of product {id}"
                ))
            })?;

        if store.compare_and_set_stock(id, current, next).await? {
            return Ok(next);
        }
        warn!(product_id = %id, attempt, "Stock changed during adjustment, retrying");
    }

    Err(CliError::Invalid(format!(
        "stock of product {id} kept changing, gave up after {MAX_ATTEMPTS} attempts"
    )))
}
