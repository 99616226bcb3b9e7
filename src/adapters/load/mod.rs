//! Load signal adapters for the adaptive scheduler.
//!
//! - `ChannelMemberLoad` - Sessions currently watching a channel
//! - `FixedLoad` - Settable value for tests and static deployments

mod channel_members;
mod fixed;

pub use channel_members::ChannelMemberLoad;
pub use fixed::FixedLoad;
