//! Live view domain - cache keys, broadcast targets, profiles and the
//! adaptive schedule, independent of any store or transport.

mod cache_key;
mod channel;
mod errors;
mod profile;
mod schedule;

pub use cache_key::{escape_glob, CacheKey, InvalidationPattern, PROFILE_FACET};
pub use channel::{BroadcastTarget, DASHBOARD_CHANNEL};
pub use errors::LiveError;
pub use profile::{Profile, ProfileLookup};
pub use schedule::{SchedulerPhase, SchedulerSettings, SchedulerState};
