//! Order service.
//!
//! Orders carry no validation beyond their shape. The delivered-order delete
//! guard lives in [`OrderRepository::delete`] so the check and the delete can
//! share a transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use petstore_core::{Order, OrderId};

use super::ServiceError;
use crate::db::OrderRepository;

const ENTITY: &str = "order";

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    #[must_use]
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on store failure.
    pub async fn create_order(&self, order: &Order) -> Result<Order, ServiceError> {
        let created = self
            .repo
            .create(order)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(order_id = %created.id, pet_id = %created.pet_id, "order placed");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist.
    pub async fn find_order_by_id(&self, id: OrderId) -> Result<Order, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Conflict` if the order was delivered and
    /// `ServiceError::NotFound` if it does not exist.
    pub async fn delete_order(&self, id: OrderId) -> Result<(), ServiceError> {
        self.repo
            .delete(id)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Order counts keyed by status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on store failure.
    pub async fn inventory(&self) -> Result<BTreeMap<String, i64>, ServiceError> {
        self.repo
            .inventory()
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }
}
