//! Order repository.
//!
//! Line items and the shipping address are stored as JSONB and decoded into
//! typed values here, at the storage boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use filament_shop_core::{
    Email, Money, NewOrder, Order, OrderId, OrderLine, OrderStatus, ShippingAddress,
};

use super::{OrderPage, RepositoryError};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    customer_name: String,
    customer_email: String,
    total: Decimal,
    placed_at: DateTime<Utc>,
    status: String,
    items: serde_json::Value,
    address: serde_json::Value,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid {what} on order {}: {e}", row.id))
        };

        let customer_email =
            Email::parse(&row.customer_email).map_err(|e| corrupt("customer email", &e))?;
        let total = Money::new(row.total).map_err(|e| corrupt("total", &e))?;
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| corrupt("status", &e))?;
        let items: Vec<OrderLine> =
            serde_json::from_value(row.items.clone()).map_err(|e| corrupt("items", &e))?;
        let address: ShippingAddress =
            serde_json::from_value(row.address.clone()).map_err(|e| corrupt("address", &e))?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer_name: row.customer_name,
            customer_email,
            total,
            date: row.placed_at,
            status,
            items,
            address,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, total, placed_at, \
                             status, items, address";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order with a generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    /// Returns `RepositoryError::DataCorruption` if items or address cannot be encoded.
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::generate();
        let items = serde_json::to_value(&order.items)
            .map_err(|e| RepositoryError::DataCorruption(format!("encode items: {e}")))?;
        let address = serde_json::to_value(&order.address)
            .map_err(|e| RepositoryError::DataCorruption(format!("encode address: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO storefront.customer_order (
                id, order_number, customer_name, customer_email, total,
                placed_at, status, items, address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(id.as_str())
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(order.customer_email.as_str())
        .bind(order.total.amount())
        .bind(order.date)
        .bind(order.status.code())
        .bind(items)
        .bind(address)
        .execute(self.pool)
        .await?;

        Ok(Order::from_new(id, order))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE storefront.customer_order
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(status.code())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// List orders newest first, optionally for a single customer.
    ///
    /// Fetches one extra row to know whether another page exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        customer_email: Option<&Email>,
        offset: u64,
        limit: u64,
    ) -> Result<OrderPage, RepositoryError> {
        let to_i64 = |n: u64| {
            i64::try_from(n).map_err(|_| RepositoryError::Conflict(format!("page bound {n} too large")))
        };

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM storefront.customer_order
            WHERE ($1::text IS NULL OR customer_email = $1)
            ORDER BY placed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(customer_email.map(Email::as_str))
        .bind(to_i64(limit.saturating_add(1))?)
        .bind(to_i64(offset)?)
        .fetch_all(self.pool)
        .await?;

        let has_more = u64::try_from(rows.len()).unwrap_or(u64::MAX) > limit;
        let orders = rows
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPage {
            orders,
            next_offset: has_more.then(|| offset + limit),
        })
    }
}
