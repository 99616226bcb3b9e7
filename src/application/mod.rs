//! Application layer - live view services and event subscribers.
//!
//! This layer orchestrates the live view domain and coordinates between
//! ports. Nothing here knows which cache, transport or store is plugged in.
//!
//! - `ProfileCacheManager` - get-or-compute profiles, invalidation
//! - `BroadcastRouter` - mutation and aggregate fan-out
//! - `AdaptiveScheduler` - periodic aggregate broadcast
//! - `ingestion` - core subscribers wiring the above to the event bus

pub mod broadcast_router;
pub mod ingestion;
pub mod profile_cache;
pub mod scheduler;

pub use broadcast_router::{
    BroadcastReport, BroadcastRouter, EntityUpdatePayload, TargetDelivery, DASHBOARD_UPDATE_EVENT,
};
pub use ingestion::{register_core_subscribers, CacheInvalidationHandler, EntityBroadcastHandler};
pub use profile_cache::{InvalidationOutcome, ProfileCacheConfig, ProfileCacheManager};
pub use scheduler::{AdaptiveScheduler, SchedulerError, SchedulerStatus};
