//! DashboardAggregator port - recomputes the global dashboard snapshot.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::DomainError;

/// Port for producing the aggregate dashboard figures.
///
/// The shape of the snapshot belongs to the surrounding service; the
/// scheduler only forwards it to the dashboard channel.
#[async_trait]
pub trait DashboardAggregator: Send + Sync {
    /// Recompute the aggregate snapshot.
    async fn compute(&self) -> Result<JsonValue, DomainError>;
}
