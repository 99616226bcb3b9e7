//! Adapters used when the live view runs as its own process.
//!
//! The host back office normally supplies the profile loader and dashboard
//! aggregator. Without one attached, profiles fall back to event hints and
//! the dashboard shows the live view's own session figures.

mod detached_loader;
mod session_snapshot;

pub use detached_loader::DetachedProfileLoader;
pub use session_snapshot::SessionSnapshotAggregator;
