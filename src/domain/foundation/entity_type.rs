//! EntityType enum naming the back-office record kinds the live view tracks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Kind of back-office record a profile or mutation refers to.
///
/// The lowercase name is used verbatim in cache keys (`seller:<id>:profile`),
/// channel names (`admin-seller-<id>`) and routing keys (`seller.updated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Seller,
    Customer,
    Order,
}

impl EntityType {
    /// All entity types, in a stable order.
    pub const ALL: [EntityType; 3] = [EntityType::Seller, EntityType::Customer, EntityType::Order];

    /// Lowercase name used in keys and channel names.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Seller => "seller",
            EntityType::Customer => "customer",
            EntityType::Order => "order",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seller" => Ok(EntityType::Seller),
            "customer" => Ok(EntityType::Customer),
            "order" => Ok(EntityType::Order),
            other => Err(ValidationError::invalid_format(
                "entity_type",
                format!("unknown entity type '{}'", other),
            )),
        }
    }
}
