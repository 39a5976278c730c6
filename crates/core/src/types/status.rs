//! Status values for pets and orders.
//!
//! Pet status is a closed set and is modelled as an enum. Order status is
//! free-form text, except that [`ORDER_STATUS_DELIVERED`] makes an order
//! undeletable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order status that freezes an order against deletion.
pub const ORDER_STATUS_DELIVERED: &str = "delivered";

/// Rejected pet status token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pet status: {0:?}")]
pub struct InvalidPetStatus(pub String);

/// Availability of a pet in the store.
///
/// Parsing is case-sensitive: only the lowercase names are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl PetStatus {
    /// Every accepted status, in declaration order.
    pub const ALL: [Self; 3] = [Self::Available, Self::Pending, Self::Sold];

    /// Wire and storage name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

impl std::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PetStatus {
    type Err = InvalidPetStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            _ => Err(InvalidPetStatus(s.to_owned())),
        }
    }
}
