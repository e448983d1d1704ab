//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Readiness (store reachable)
//!
//! # Catalog
//! GET    /api/products                        - Product list
//! GET    /api/products/{id}                   - Product detail
//!
//! # Orders
//! POST   /api/orders                          - Place order (guest or signed in)
//! GET    /api/orders?cursor=                  - Order history (auth)
//!
//! # Account (requires auth)
//! GET    /api/account                         - Profile (created on first use)
//! POST   /api/account/addresses               - Add address
//! PUT    /api/account/addresses/{id}          - Edit address
//! POST   /api/account/addresses/{id}/default  - Make default
//! DELETE /api/account/addresses/{id}          - Delete address
//!
//! # Admin (requires ADMINS group)
//! POST   /api/admin/products                  - Create product
//! PUT    /api/admin/products/{id}             - Replace product
//! DELETE /api/admin/products/{id}             - Delete product
//! PUT    /api/admin/orders/{id}/status        - Change order status
//! ```

pub mod account;
pub mod admin;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(orders::place).get(orders::index))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show))
        .route("/addresses", post(account::create_address))
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route("/addresses/{id}/default", post(account::set_default_address))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/orders/{id}/status", put(admin::update_order_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/account", account_routes())
        .nest("/api/admin", admin_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests;
