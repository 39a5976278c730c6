//! Order repository for database operations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;

use petstore_core::{ORDER_STATUS_DELIVERED, Order, OrderId};

use super::RepositoryError;

/// Message carried by the conflict raised when deleting a delivered order.
pub const DELIVERED_ORDER_CONFLICT: &str = "cannot delete a delivered order";

/// Storage capability for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order; the returned order carries the store-assigned id.
    async fn create(&self, order: &Order) -> Result<Order, RepositoryError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Order, RepositoryError>;

    /// Delete an order unless it has been delivered.
    ///
    /// The status check and the delete happen atomically. Returns
    /// `RepositoryError::Conflict` for a delivered order and
    /// `RepositoryError::NotFound` if the id is unknown.
    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError>;

    /// Order counts grouped by status. Statuses with no orders are absent.
    async fn inventory(&self) -> Result<BTreeMap<String, i64>, RepositoryError>;
}

/// `PostgreSQL` order repository.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> Result<Order, RepositoryError> {
        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders (pet_id, quantity, ship_date, status, complete)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(order.pet_id)
        .bind(order.quantity)
        .bind(order.ship_date)
        .bind(&order.status)
        .bind(order.complete)
        .fetch_one(&self.pool)
        .await?;

        Ok(Order {
            id,
            ..order.clone()
        })
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            SELECT id, pet_id, quantity, ship_date, status, complete
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match status.as_deref() {
            None => return Err(RepositoryError::NotFound),
            Some(ORDER_STATUS_DELIVERED) => {
                return Err(RepositoryError::Conflict(DELIVERED_ORDER_CONFLICT.to_owned()));
            }
            Some(_) => {}
        }

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn inventory(&self) -> Result<BTreeMap<String, i64>, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }
}
