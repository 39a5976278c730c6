//! Purchase order entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ORDER_STATUS_DELIVERED, OrderId, PetId};

/// An order placed for a pet.
///
/// Orders are flat, so the same struct is used on the wire and as the
/// storage row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub pet_id: PetId,
    pub quantity: i32,
    pub ship_date: DateTime<Utc>,
    pub status: String,
    pub complete: bool,
}

impl Order {
    /// Delivered orders can no longer be deleted.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.status == ORDER_STATUS_DELIVERED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_json_shape() {
        let order: Order = serde_json::from_str(
            r#"{"id":10,"petId":3,"quantity":2,"shipDate":"2025-03-29T15:04:05Z","status":"placed","complete":false}"#,
        )
        .unwrap();

        assert_eq!(order.id, OrderId::new(10));
        assert_eq!(order.pet_id, PetId::new(3));
        assert_eq!(order.quantity, 2);
        assert_eq!(order.ship_date.to_rfc3339(), "2025-03-29T15:04:05+00:00");
        assert!(!order.is_delivered());

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["petId"], 3);
        assert_eq!(value["shipDate"], "2025-03-29T15:04:05Z");
    }

    #[test]
    fn test_delivered_is_exact_match() {
        let mut order = Order {
            status: "delivered".to_owned(),
            ..Order::default()
        };
        assert!(order.is_delivered());

        order.status = "Delivered".to_owned();
        assert!(!order.is_delivered());
    }
}
