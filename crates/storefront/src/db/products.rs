//! Product repository.
//!
//! Queries are built at runtime with `query_as` and `FromRow` row types, so
//! the crate builds without a live database.

use rust_decimal::Decimal;
use sqlx::PgPool;

use filament_shop_core::{FilamentType, Money, Product, ProductId, ProductInput};

use super::{RepositoryError, stock_from_db, stock_to_db};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    filament_type: String,
    color: String,
    hex: String,
    price: Decimal,
    weight: String,
    description: String,
    image: String,
    available: bool,
    brand: Option<String>,
    stock: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let filament_type = row
            .filament_type
            .parse::<FilamentType>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let price = Money::new(row.price)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            filament_type,
            color: row.color,
            hex: row.hex,
            price,
            weight: row.weight,
            description: row.description,
            image: row.image,
            available: row.available,
            brand: row.brand,
            stock: stock_from_db(row.stock)?,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, filament_type, color, hex, price, weight, description, \
                               image, available, brand, stock";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a new product with a generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id = ProductId::generate();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO storefront.product (
                id, name, filament_type, color, hex, price, weight,
                description, image, available, brand, stock
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(&input.name)
        .bind(input.filament_type.code())
        .bind(&input.color)
        .bind(&input.hex)
        .bind(input.price.amount())
        .bind(&input.weight)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.available)
        .bind(input.brand.as_deref())
        .bind(stock_to_db(input.stock)?)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Replace all fields of a product, including stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub async fn update(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE storefront.product
            SET name = $2, filament_type = $3, color = $4, hex = $5, price = $6,
                weight = $7, description = $8, image = $9, available = $10,
                brand = $11, stock = $12, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(&input.name)
        .bind(input.filament_type.code())
        .bind(&input.color)
        .bind(&input.hex)
        .bind(input.price.amount())
        .bind(&input.weight)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.available)
        .bind(input.brand.as_deref())
        .bind(stock_to_db(input.stock)?)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a product. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Conditionally set stock: succeeds only if stock still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn compare_and_set_stock(
        &self,
        id: &ProductId,
        expected: u32,
        new: u32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.product
            SET stock = $3, updated_at = now()
            WHERE id = $1 AND stock = $2
            ",
        )
        .bind(id.as_str())
        .bind(stock_to_db(expected)?)
        .bind(stock_to_db(new)?)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
