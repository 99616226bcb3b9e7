//! BroadcastRouter - turns mutations into channel emits.
//!
//! Every mutation reaches three channels: the global dashboard, the admin
//! view of the entity, and the entity's own channel. The entity profile is
//! fetched once per mutation and shared by all three publishes.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainEvent, EventId};
use crate::domain::live::{BroadcastTarget, LiveError};
use crate::ports::SessionRegistry;

use super::profile_cache::ProfileCacheManager;

/// Event name used for aggregate dashboard snapshots.
pub const DASHBOARD_UPDATE_EVENT: &str = "dashboard.update";

/// Payload sent to every target of an entity mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdatePayload {
    pub event_id: String,
    pub kind: String,
    pub entity_type: String,
    pub entity_id: String,
    pub actor_id: String,
    pub occurred_at: String,
    /// Fresh profile data, the producer's hint, or null when neither exists.
    pub profile: Option<JsonValue>,
}

/// Result of publishing to one target.
#[derive(Debug, Clone)]
pub struct TargetDelivery {
    pub target: BroadcastTarget,
    pub result: Result<usize, LiveError>,
}

/// Per-target results of one entity broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastReport {
    pub event_id: EventId,
    pub deliveries: Vec<TargetDelivery>,
}

impl BroadcastReport {
    /// Total sessions reached across targets that succeeded.
    pub fn sessions_reached(&self) -> usize {
        self.deliveries
            .iter()
            .filter_map(|d| d.result.as_ref().ok())
            .sum()
    }

    pub fn failures(&self) -> Vec<&LiveError> {
        self.deliveries
            .iter()
            .filter_map(|d| d.result.as_ref().err())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.deliveries.iter().all(|d| d.result.is_ok())
    }
}

/// Routes mutations and aggregate snapshots to channels.
pub struct BroadcastRouter {
    registry: Arc<dyn SessionRegistry>,
    profiles: Arc<ProfileCacheManager>,
}

impl BroadcastRouter {
    pub fn new(registry: Arc<dyn SessionRegistry>, profiles: Arc<ProfileCacheManager>) -> Self {
        Self { registry, profiles }
    }

    /// Targets an event must reach. Pure; no I/O.
    pub fn targets_for(&self, event: &DomainEvent) -> BTreeSet<BroadcastTarget> {
        BroadcastTarget::for_event(event)
    }

    /// Emit to whoever is joined to the target's channel right now.
    pub async fn publish(
        &self,
        target: &BroadcastTarget,
        event_name: &str,
        payload: JsonValue,
    ) -> Result<usize, LiveError> {
        let channel = target.channel_name();
        self.registry
            .emit_to_channel(&channel, event_name, payload)
            .await
            .map_err(|e| LiveError::PublishFailed {
                channel,
                reason: e.to_string(),
            })
    }

    /// Fetch the entity's profile once and publish it to every target.
    ///
    /// Each publish is independent; one failing target never stops the
    /// others. Failures are logged and recorded in the report.
    pub async fn broadcast_entity_update(&self, event: &DomainEvent) -> BroadcastReport {
        let profile = self
            .profiles
            .get_profile_or_else(event.entity_type, &event.entity_id, event.payload_hint.clone())
            .await;

        let event_name = event.event_type();
        let payload = EntityUpdatePayload {
            event_id: event.event_id.to_string(),
            kind: event.kind.as_str().to_string(),
            entity_type: event.entity_type.as_str().to_string(),
            entity_id: event.entity_id.to_string(),
            actor_id: event.actor_id.to_string(),
            occurred_at: event.occurred_at.to_rfc3339(),
            profile,
        };
        let payload = match serde_json::to_value(&payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(event_id = %event.event_id, error = %e, "Failed to encode entity update");
                JsonValue::Null
            }
        };

        let targets: Vec<BroadcastTarget> = self.targets_for(event).into_iter().collect();
        let results = join_all(
            targets
                .iter()
                .map(|target| self.publish(target, &event_name, payload.clone())),
        )
        .await;

        let deliveries: Vec<TargetDelivery> = targets
            .into_iter()
            .zip(results)
            .map(|(target, result)| {
                match &result {
                    Ok(reached) => tracing::debug!(
                        channel = %target,
                        scope = target.scope(),
                        reached,
                        event_type = %event_name,
                        "Published entity update"
                    ),
                    Err(e) => tracing::warn!(
                        channel = %target,
                        scope = target.scope(),
                        kind = e.kind(),
                        error = %e,
                        "Entity update publish failed"
                    ),
                }
                TargetDelivery { target, result }
            })
            .collect();

        BroadcastReport {
            event_id: event.event_id.clone(),
            deliveries,
        }
    }

    /// Publish an aggregate snapshot to the dashboard channel only.
    pub async fn broadcast_aggregate(&self, payload: JsonValue) -> Result<usize, LiveError> {
        self.publish(&BroadcastTarget::Dashboard, DASHBOARD_UPDATE_EVENT, payload)
            .await
    }
}
