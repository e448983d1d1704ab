//! Data store access for the storefront.
//!
//! # Database: `filament_shop`
//!
//! The storefront owns all shop data:
//!
//! ## Tables (schema `storefront`)
//!
//! - `product` - Catalog with live stock counts
//! - `customer_order` - Placed orders; line items and address stored as JSONB
//! - `user_profile` - Profiles linked to identities by email; address book as JSONB
//!
//! # Store traits
//!
//! Business logic talks to the traits in this module, never to a concrete
//! backend. [`PgStore`] is the production backend; [`MemoryStore`] backs
//! tests and local demos.
//!
//! Product stock is only decremented through
//! [`CatalogStore::compare_and_set_stock`]. Admin edits set stock directly and
//! can race with checkouts.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p filament-shop-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod profiles;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use filament_shop_core::{
    AddressBook, Email, NewOrder, Order, OrderId, OrderStatus, Product, ProductId, ProductInput,
    Role, UserProfile, UserProfileId,
};

pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use profiles::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// One page of orders.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Offset of the next page, if more orders exist.
    pub next_offset: Option<u64>,
}

/// Product reads and writes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, sorted by name.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create_product(&self, input: ProductInput) -> Result<Product, RepositoryError>;

    /// Replace every field, including stock (a direct, unconditioned set).
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn update_product(
        &self,
        id: &ProductId,
        input: ProductInput,
    ) -> Result<Product, RepositoryError>;

    /// Returns `true` if a product was deleted.
    async fn delete_product(&self, id: &ProductId) -> Result<bool, RepositoryError>;

    /// Set stock to `new` only if it still equals `expected`.
    ///
    /// Returns `false` when the precondition failed (or the product is gone).
    async fn compare_and_set_stock(
        &self,
        id: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, RepositoryError>;
}

/// Order reads and writes.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the order does not exist.
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError>;

    /// Orders newest first, optionally restricted to one customer email.
    async fn list_orders(
        &self,
        customer_email: Option<&Email>,
        offset: u64,
        limit: u64,
    ) -> Result<OrderPage, RepositoryError>;
}

/// Profile reads and writes.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, RepositoryError>;

    /// Returns `RepositoryError::Conflict` if a profile with this email exists.
    async fn create_profile(
        &self,
        name: &str,
        email: &Email,
        role: Role,
    ) -> Result<UserProfile, RepositoryError>;

    /// Overwrite the stored address list (last write wins).
    async fn save_addresses(
        &self,
        id: &UserProfileId,
        addresses: &AddressBook,
    ) -> Result<(), RepositoryError>;
}

/// Everything the storefront needs from its backend.
#[async_trait]
pub trait ShopStore: CatalogStore + OrderStore + ProfileStore {
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` implementation of [`ShopStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).list().await
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_product(&self, input: ProductInput) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).create(&input).await
    }

    async fn update_product(
        &self,
        id: &ProductId,
        input: ProductInput,
    ) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).update(id, &input).await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        ProductRepository::new(&self.pool).delete(id).await
    }

    async fn compare_and_set_stock(
        &self,
        id: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, RepositoryError> {
        ProductRepository::new(&self.pool)
            .compare_and_set_stock(id, expected, new)
            .await
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        OrderRepository::new(&self.pool).create(order).await
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).get_by_id(id).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        OrderRepository::new(&self.pool).update_status(id, status).await
    }

    async fn list_orders(
        &self,
        customer_email: Option<&Email>,
        offset: u64,
        limit: u64,
    ) -> Result<OrderPage, RepositoryError> {
        OrderRepository::new(&self.pool)
            .list(customer_email, offset, limit)
            .await
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        ProfileRepository::new(&self.pool).get_by_email(email).await
    }

    async fn create_profile(
        &self,
        name: &str,
        email: &Email,
        role: Role,
    ) -> Result<UserProfile, RepositoryError> {
        ProfileRepository::new(&self.pool)
            .create(name, email, role)
            .await
    }

    async fn save_addresses(
        &self,
        id: &UserProfileId,
        addresses: &AddressBook,
    ) -> Result<(), RepositoryError> {
        ProfileRepository::new(&self.pool)
            .save_addresses(id, addresses)
            .await
    }
}

#[async_trait]
impl ShopStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Shared handle to whichever backend is configured.
pub type SharedStore = Arc<dyn ShopStore>;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a stored `INTEGER` stock count into the domain type.
pub(crate) fn stock_from_db(stock: i32) -> Result<u32, RepositoryError> {
    u32::try_from(stock)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative stock in database: {stock}")))
}

/// Convert a domain stock count into a bindable `INTEGER`.
pub(crate) fn stock_to_db(stock: u32) -> Result<i32, RepositoryError> {
    i32::try_from(stock)
        .map_err(|_| RepositoryError::Conflict(format!("stock {stock} exceeds storage range")))
}
