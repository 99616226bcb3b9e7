//! Broadcast targets and the channel names sessions join.
//!
//! ```text
//! admin-dashboard          every admin watching the global dashboard
//! admin-seller-<id>        admins viewing seller <id>
//! seller-<id>              seller <id>'s own session
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainEvent, EntityId, EntityType, ValidationError};

/// Channel name of the global admin dashboard.
pub const DASHBOARD_CHANNEL: &str = "admin-dashboard";

const ADMIN_PREFIX: &str = "admin-";

/// An addressable fan-out group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BroadcastTarget {
    /// Global dashboard channel.
    Dashboard,
    /// Admins subscribed to one entity.
    AdminEntity {
        entity_type: EntityType,
        entity_id: EntityId,
    },
    /// The entity's own session.
    EntitySelf {
        entity_type: EntityType,
        entity_id: EntityId,
    },
}

impl BroadcastTarget {
    /// Targets a mutation of the event's entity must reach.
    ///
    /// Always the dashboard plus the admin-scoped and self-scoped channels of
    /// the entity. Pure and deterministic.
    pub fn for_event(event: &DomainEvent) -> BTreeSet<BroadcastTarget> {
        let mut targets = BTreeSet::new();
        targets.insert(BroadcastTarget::Dashboard);
        targets.insert(BroadcastTarget::AdminEntity {
            entity_type: event.entity_type,
            entity_id: event.entity_id.clone(),
        });
        targets.insert(BroadcastTarget::EntitySelf {
            entity_type: event.entity_type,
            entity_id: event.entity_id.clone(),
        });
        targets
    }

    /// Channel name sessions join to receive this target's payloads.
    pub fn channel_name(&self) -> String {
        match self {
            BroadcastTarget::Dashboard => DASHBOARD_CHANNEL.to_string(),
            BroadcastTarget::AdminEntity {
                entity_type,
                entity_id,
            } => format!("{}{}-{}", ADMIN_PREFIX, entity_type, entity_id),
            BroadcastTarget::EntitySelf {
                entity_type,
                entity_id,
            } => format!("{}-{}", entity_type, entity_id),
        }
    }

    /// Short label for logs.
    pub fn scope(&self) -> &'static str {
        match self {
            BroadcastTarget::Dashboard => "dashboard",
            BroadcastTarget::AdminEntity { .. } => "admin",
            BroadcastTarget::EntitySelf { .. } => "self",
        }
    }
}

impl fmt::Display for BroadcastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.channel_name())
    }
}

impl FromStr for BroadcastTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == DASHBOARD_CHANNEL {
            return Ok(BroadcastTarget::Dashboard);
        }

        let (admin, rest) = match s.strip_prefix(ADMIN_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (entity_type, entity_id) = rest
            .split_once('-')
            .ok_or_else(|| ValidationError::invalid_format("channel", "expected <entityType>-<id>"))?;
        let entity_type: EntityType = entity_type.parse()?;
        let entity_id = EntityId::new(entity_id)?;

        Ok(if admin {
            BroadcastTarget::AdminEntity {
                entity_type,
                entity_id,
            }
        } else {
            BroadcastTarget::EntitySelf {
                entity_type,
                entity_id,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ActorId, MutationKind};

    fn seller_status_event(id: &str) -> DomainEvent {
        DomainEvent::status_changed(
            EntityType::Seller,
            EntityId::new(id).unwrap(),
            ActorId::new("admin-1").unwrap(),
        )
    }

    #[test]
    fn status_change_maps_to_exactly_three_targets() {
        let targets = BroadcastTarget::for_event(&seller_status_event("s1"));

        let names: Vec<String> = targets.iter().map(|t| t.channel_name()).collect();
        assert_eq!(targets.len(), 3);
        assert!(names.contains(&"admin-dashboard".to_string()));
        assert!(names.contains(&"admin-seller-s1".to_string()));
        assert!(names.contains(&"seller-s1".to_string()));
    }

    #[test]
    fn targets_are_stable_across_calls() {
        let event = seller_status_event("s1");
        assert_eq!(BroadcastTarget::for_event(&event), BroadcastTarget::for_event(&event));
    }

    #[test]
    fn every_mutation_kind_maps_to_three_targets() {
        for kind in [
            MutationKind::Created,
            MutationKind::Updated,
            MutationKind::StatusChanged,
            MutationKind::Deleted,
        ] {
            let event = DomainEvent::new(
                kind,
                EntityType::Customer,
                EntityId::new("c1").unwrap(),
                ActorId::new("admin-1").unwrap(),
            );
            assert_eq!(BroadcastTarget::for_event(&event).len(), 3);
        }
    }

    #[test]
    fn channel_names_parse_back_to_targets() {
        let id = EntityId::new("64f-abc").unwrap();
        let targets = [
            BroadcastTarget::Dashboard,
            BroadcastTarget::AdminEntity {
                entity_type: EntityType::Order,
                entity_id: id.clone(),
            },
            BroadcastTarget::EntitySelf {
                entity_type: EntityType::Customer,
                entity_id: id,
            },
        ];

        for target in targets {
            let parsed: BroadcastTarget = target.channel_name().parse().unwrap();
            assert_eq!(parsed, target);
        }
    }

    #[test]
    fn unknown_channel_names_are_rejected() {
        assert!("admin-warehouse-1".parse::<BroadcastTarget>().is_err());
        assert!("seller".parse::<BroadcastTarget>().is_err());
        assert!("seller-".parse::<BroadcastTarget>().is_err());
    }
}
